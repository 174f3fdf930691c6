//! Route definitions for the `/grupos` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// ```text
/// GET    /grupos/                    -> list
/// POST   /grupos/                    -> create
/// GET    /grupos/{id}/               -> get_by_id
/// PATCH  /grupos/{id}/               -> update
/// DELETE /grupos/{id}/               -> delete
/// PATCH  /grupos/{id}/participar/    -> join
/// PATCH  /grupos/{id}/ativar/        -> activate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/grupos/", get(groups::list).post(groups::create))
        .route(
            "/grupos/{id}/",
            get(groups::get_by_id)
                .patch(groups::update)
                .delete(groups::delete),
        )
        .route("/grupos/{id}/participar/", patch(groups::join))
        .route("/grupos/{id}/ativar/", patch(groups::activate))
}
