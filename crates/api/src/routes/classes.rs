//! Route definitions for the `/turmas` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::classes;
use crate::state::AppState;

/// ```text
/// GET    /turmas/                        -> list
/// POST   /turmas/                        -> create
/// GET    /turmas/{id}/                   -> get_by_id
/// PATCH  /turmas/{id}/                   -> update
/// DELETE /turmas/{id}/                   -> delete
/// PATCH  /turmas/{id}/participar/        -> enroll
/// PATCH  /turmas/{id}/remover-alunos/    -> unenroll
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/turmas/", get(classes::list).post(classes::create))
        .route(
            "/turmas/{id}/",
            get(classes::get_by_id)
                .patch(classes::update)
                .delete(classes::delete),
        )
        .route("/turmas/{id}/participar/", patch(classes::enroll))
        .route("/turmas/{id}/remover-alunos/", patch(classes::unenroll))
}
