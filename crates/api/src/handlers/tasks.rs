//! Handlers for the `/tarefas` resource.
//!
//! A task posted on a project is copied once per group currently selecting
//! the project. Students only reach tasks through the groups they lead or
//! belong to.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sgp_core::error::CoreError;
use sgp_core::pagination::resolve_page;
use sgp_core::roles::Role;
use sgp_core::task::{
    ensure_task_project_owner, format_deadline, parse_date, parse_deadline, parse_time,
    plan_task_update, TaskChanges, MSG_PROJECT_INVALID, TASK_NAME_MAX_LEN,
};
use sgp_core::types::DbId;
use sgp_db::models::project::Project;
use sgp_db::models::task::{CreateTask, Task, TaskDetail, TaskFilter, UpdateTask};
use sgp_db::repositories::{ProjectRepo, StudentRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{Actor, RequireProfessor, RequireStudent};
use crate::query::PageParams;
use crate::response::Page;
use crate::state::AppState;

const MSG_NAME: &str = "Informe um nome com até 40 caracteres.";
const MSG_RESPONSIBLE_INVALID: &str = "Aluno responsável inválido ou inativo.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /tarefas/`. `data` is `dd/mm/yyyy`, `hora` is
/// `HH:MM:SS`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub projeto: DbId,
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    pub data: String,
    pub hora: String,
    pub responsavel: Option<DbId>,
}

/// Request body for `PATCH /tarefas/{id}/`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub projeto: Option<DbId>,
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub situacao: Option<String>,
    pub data: Option<String>,
    pub hora: Option<String>,
    pub ativo: Option<bool>,
}

/// Query filters for `GET /tarefas/`. Date bounds are `dd/mm/yyyy`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub nome: Option<String>,
    pub situacao: Option<String>,
    pub disciplina: Option<DbId>,
    pub projeto: Option<DbId>,
    pub professor: Option<DbId>,
    pub de_data: Option<String>,
    pub ate_data: Option<String>,
    pub ativo: Option<bool>,
}

impl TaskQuery {
    fn into_filter(self) -> Result<TaskFilter, CoreError> {
        Ok(TaskFilter {
            name: self.nome.filter(|n| !n.trim().is_empty()),
            status: self.situacao,
            discipline_id: self.disciplina,
            project_id: self.projeto,
            professor_id: self.professor,
            from_date: self.de_data.as_deref().map(parse_date).transpose()?,
            to_date: self.ate_data.as_deref().map(parse_date).transpose()?,
            is_active: self.ativo,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub codigo: DbId,
    pub nome: String,
}

#[derive(Debug, Serialize)]
pub struct TaskProject {
    pub codigo: DbId,
    pub nome: String,
    pub professor: NamedRef,
    pub disciplina: NamedRef,
}

/// One task copy. `grupo` is the group this copy belongs to, if any.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub codigo: DbId,
    pub nome: String,
    pub descricao: String,
    pub situacao: String,
    /// `dd/mm/yyyy HH:MM:SS`.
    pub prazo: String,
    pub ativo: bool,
    pub responsavel: Option<DbId>,
    pub grupo: Option<DbId>,
    pub projeto: TaskProject,
}

impl TaskResponse {
    fn new(task: Task, projeto: TaskProject, grupo: Option<DbId>) -> Self {
        Self {
            codigo: task.id,
            prazo: format_deadline(task.deadline),
            nome: task.name,
            descricao: task.description,
            situacao: task.status,
            ativo: task.is_active,
            responsavel: task.responsible_id,
            grupo,
            projeto,
        }
    }
}

impl From<TaskDetail> for TaskResponse {
    fn from(detail: TaskDetail) -> Self {
        let projeto = TaskProject {
            codigo: detail.task.project_id,
            nome: detail.project_name,
            professor: NamedRef {
                codigo: detail.professor_id,
                nome: detail.professor_name,
            },
            disciplina: NamedRef {
                codigo: detail.discipline_id,
                nome: detail.discipline_name,
            },
        };
        TaskResponse::new(detail.task, projeto, detail.group_id)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn check_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.chars().count() > TASK_NAME_MAX_LEN {
        return Err(CoreError::validation("nome", MSG_NAME));
    }
    Ok(())
}

/// An active project the professor owns.
async fn postable_project(state: &AppState, professor_id: DbId, id: DbId) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| CoreError::validation("projeto", MSG_PROJECT_INVALID))?;
    ensure_task_project_owner(Role::Professor(professor_id), project.professor_id)?;
    Ok(project)
}

/// A task whose project the professor owns; anything else is a 404.
async fn owned(state: &AppState, professor_id: DbId, id: DbId) -> AppResult<Task> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    let owns = ProjectRepo::find_by_id(&state.pool, task.project_id)
        .await?
        .is_some_and(|p| p.professor_id == professor_id);
    if !owns {
        return Err(AppError::not_found("Task", id));
    }
    Ok(task)
}

async fn detail(state: &AppState, role: Role, id: DbId) -> AppResult<TaskResponse> {
    TaskRepo::find_detail(&state.pool, role, id)
        .await?
        .map(TaskResponse::from)
        .ok_or(AppError::not_found("Task", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /tarefas/
///
/// Answers with every copy created: one per selecting group, or a single
/// unlinked task when no group has selected the project.
pub async fn create(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<Vec<TaskResponse>>)> {
    check_name(&input.nome)?;
    let project = postable_project(&state, professor.id, input.projeto).await?;
    let deadline = parse_deadline(&input.data, &input.hora)?;

    if let Some(student_id) = input.responsavel {
        StudentRepo::find_by_id(&state.pool, student_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| CoreError::validation("responsavel", MSG_RESPONSIBLE_INVALID))?;
    }

    let copies = TaskRepo::create_fan_out(
        &state.pool,
        &CreateTask {
            project_id: project.id,
            responsible_id: input.responsavel,
            name: input.nome.trim().to_string(),
            description: input.descricao,
            deadline,
        },
    )
    .await?;

    let project_detail = ProjectRepo::find_detail(&state.pool, project.id)
        .await?
        .ok_or(AppError::not_found("Project", project.id))?;
    let copies = copies
        .into_iter()
        .map(|(task, group_id)| {
            let projeto = TaskProject {
                codigo: project.id,
                nome: project.name.clone(),
                professor: NamedRef {
                    codigo: project.professor_id,
                    nome: project_detail.professor_name.clone(),
                },
                disciplina: NamedRef {
                    codigo: project.discipline_id,
                    nome: project_detail.discipline_name.clone(),
                },
            };
            TaskResponse::new(task, projeto, group_id)
        })
        .collect();

    Ok((StatusCode::CREATED, Json(copies)))
}

/// GET /tarefas/
pub async fn list(
    State(state): State<AppState>,
    Actor(role): Actor,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<Page<TaskResponse>>> {
    let filter = query.into_filter()?;
    let total = TaskRepo::count(&state.pool, role, &filter).await?;
    let window = resolve_page(page.pagina.as_deref(), total, state.config.page_size)?;
    let tasks = TaskRepo::list(&state.pool, role, &filter, window.limit(), window.offset())
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();
    Ok(Json(Page::new(window, &uri, tasks)))
}

/// GET /tarefas/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    Actor(role): Actor,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskResponse>> {
    Ok(Json(detail(&state, role, id).await?))
}

/// PATCH /tarefas/{id}/
///
/// Changing `projeto` moves every active copy sharing this task's project and
/// name. The other fields apply to this copy only.
pub async fn update(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = owned(&state, professor.id, id).await?;
    if let Some(name) = &input.nome {
        check_name(name)?;
    }
    if let Some(project_id) = input.projeto.filter(|p| *p != task.project_id) {
        postable_project(&state, professor.id, project_id).await?;
    }

    let deadline = match (&input.data, &input.hora) {
        (None, None) => None,
        (date, time) => {
            let date = match date {
                Some(d) => parse_date(d)?,
                None => task.deadline.date(),
            };
            let time = match time {
                Some(t) => parse_time(t)?,
                None => task.deadline.time(),
            };
            Some(date.and_time(time))
        }
    };

    let plan = plan_task_update(
        task.project_id,
        input.projeto,
        TaskChanges {
            name: input.nome.map(|n| n.trim().to_string()),
            description: input.descricao,
            status: input.situacao,
            deadline,
            is_active: input.ativo,
        },
    )?;

    let changes = UpdateTask {
        name: plan.changes.name,
        description: plan.changes.description,
        status: plan.changes.status,
        deadline: plan.changes.deadline,
        is_active: plan.changes.is_active,
    };
    TaskRepo::apply_update(&state.pool, id, plan.move_to_project, &changes)
        .await?
        .ok_or(AppError::not_found("Task", id))?;

    tracing::info!(task_id = %id, moved = plan.move_to_project.is_some(), "Task updated");
    Ok(Json(detail(&state, Role::Professor(professor.id), id).await?))
}

/// DELETE /tarefas/{id}/
///
/// The task is cancelled and kept.
pub async fn delete(
    State(state): State<AppState>,
    RequireProfessor(professor): RequireProfessor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned(&state, professor.id, id).await?;
    TaskRepo::deactivate(&state.pool, id).await?;
    tracing::info!(task_id = %id, "Task cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tarefas/{id}/visualizar/
pub async fn view(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskResponse>> {
    if !TaskRepo::visible_to_student(&state.pool, id, student.id).await? {
        return Err(AppError::not_found("Task", id));
    }
    Ok(Json(detail(&state, Role::Student(student.id), id).await?))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn date_bounds_are_parsed_from_day_first_format() {
        let query = TaskQuery {
            de_data: Some("01/03/2026".into()),
            ate_data: Some("31/03/2026".into()),
            ..TaskQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.from_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(filter.to_date, NaiveDate::from_ymd_opt(2026, 3, 31));
    }

    #[test]
    fn malformed_date_bound_is_a_validation_error() {
        let query = TaskQuery {
            de_data: Some("2026-03-01".into()),
            ..TaskQuery::default()
        };
        assert_matches!(query.into_filter(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_name_filter_is_dropped() {
        let query = TaskQuery {
            nome: Some("  ".into()),
            ..TaskQuery::default()
        };
        assert!(query.into_filter().unwrap().name.is_none());
    }

    #[test]
    fn overlong_name_is_rejected() {
        assert!(check_name("Entrega parcial").is_ok());
        assert_matches!(
            check_name(&"n".repeat(TASK_NAME_MAX_LEN + 1)),
            Err(CoreError::Validation(_))
        );
    }
}
