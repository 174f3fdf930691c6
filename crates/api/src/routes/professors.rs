//! Route definitions for the `/professores` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::professors;
use crate::state::AppState;

/// ```text
/// GET    /professores/          -> list
/// POST   /professores/          -> create
/// GET    /professores/{id}/     -> get_by_id
/// PATCH  /professores/{id}/     -> update
/// DELETE /professores/{id}/     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/professores/", get(professors::list).post(professors::create))
        .route(
            "/professores/{id}/",
            get(professors::get_by_id)
                .patch(professors::update)
                .delete(professors::delete),
        )
}
