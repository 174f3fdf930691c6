//! Route definitions for the `/disciplinas` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::disciplines;
use crate::state::AppState;

/// ```text
/// GET    /disciplinas/          -> list
/// POST   /disciplinas/          -> create
/// GET    /disciplinas/{id}/     -> get_by_id
/// PATCH  /disciplinas/{id}/     -> update
/// DELETE /disciplinas/{id}/     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/disciplinas/",
            get(disciplines::list).post(disciplines::create),
        )
        .route(
            "/disciplinas/{id}/",
            get(disciplines::get_by_id)
                .patch(disciplines::update)
                .delete(disciplines::delete),
        )
}
