pub mod auth;
pub mod classes;
pub mod disciplines;
pub mod groups;
pub mod health;
pub mod professors;
pub mod projects;
pub mod students;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Every resource router registers full paths with a trailing slash, so the
/// routers are merged rather than nested.
///
/// ```text
/// /login/                                  login (public)
/// /recuperar-acesso/senha/                 password recovery (public)
/// /cadastre-se/?usuario=aluno|professor    signup (public)
///
/// /alunos/                                 list, create
/// /alunos/{id}/                            get, update, deactivate
/// /professores/                            list, create
/// /professores/{id}/                       get, update, deactivate
///
/// /disciplinas/                            list, create
/// /disciplinas/{id}/                       get, update, deactivate
///
/// /turmas/                                 list, create
/// /turmas/{id}/                            get, update, deactivate
/// /turmas/{id}/participar/                 enroll students
/// /turmas/{id}/remover-alunos/             remove enrollments
///
/// /projetos/                               list, create
/// /projetos/{id}/                          get, update, deactivate
/// /projetos/{id}/gerenciar-grupos/         attach, detach, consolidate
///
/// /grupos/                                 list, create
/// /grupos/{id}/                            get, update, deactivate
/// /grupos/{id}/participar/                 join
/// /grupos/{id}/ativar/                     activate (professor)
///
/// /tarefas/                                list, create (fan-out)
/// /tarefas/{id}/                           get, update, cancel
/// /tarefas/{id}/visualizar/                student view
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(students::router())
        .merge(professors::router())
        .merge(disciplines::router())
        .merge(classes::router())
        .merge(projects::router())
        .merge(groups::router())
        .merge(tasks::router())
}
