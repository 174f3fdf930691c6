//! Route definitions for the `/alunos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// ```text
/// GET    /alunos/          -> list
/// POST   /alunos/          -> create
/// GET    /alunos/{id}/     -> get_by_id
/// PATCH  /alunos/{id}/     -> update
/// DELETE /alunos/{id}/     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alunos/", get(students::list).post(students::create))
        .route(
            "/alunos/{id}/",
            get(students::get_by_id)
                .patch(students::update)
                .delete(students::delete),
        )
}
