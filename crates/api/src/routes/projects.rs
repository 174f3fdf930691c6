//! Route definitions for the `/projetos` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// ```text
/// GET    /projetos/                          -> list
/// POST   /projetos/                          -> create
/// GET    /projetos/{id}/                     -> get_by_id
/// PATCH  /projetos/{id}/                     -> update
/// DELETE /projetos/{id}/                     -> delete
/// PATCH  /projetos/{id}/gerenciar-grupos/    -> manage_groups
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projetos/", get(projects::list).post(projects::create))
        .route(
            "/projetos/{id}/",
            get(projects::get_by_id)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/projetos/{id}/gerenciar-grupos/",
            patch(projects::manage_groups),
        )
}
