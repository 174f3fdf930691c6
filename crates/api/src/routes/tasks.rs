//! Route definitions for the `/tarefas` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// ```text
/// GET    /tarefas/                    -> list
/// POST   /tarefas/                    -> create
/// GET    /tarefas/{id}/               -> get_by_id
/// PATCH  /tarefas/{id}/               -> update
/// DELETE /tarefas/{id}/               -> delete
/// GET    /tarefas/{id}/visualizar/    -> view
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tarefas/", get(tasks::list).post(tasks::create))
        .route(
            "/tarefas/{id}/",
            get(tasks::get_by_id)
                .patch(tasks::update)
                .delete(tasks::delete),
        )
        .route("/tarefas/{id}/visualizar/", get(tasks::view))
}
