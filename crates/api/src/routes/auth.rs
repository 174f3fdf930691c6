//! Public account routes.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// ```text
/// POST   /login/                       -> login
/// PATCH  /recuperar-acesso/senha/      -> recover_password
/// POST   /cadastre-se/                 -> signup
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", post(auth::login))
        .route("/recuperar-acesso/senha/", patch(auth::recover_password))
        .route("/cadastre-se/", post(auth::signup))
}
