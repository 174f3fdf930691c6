use std::sync::Arc;

use sgp_events::MailQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and the mail queue are handles, the config is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sgp_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Producer side of the welcome-mail queue.
    pub mail: MailQueue,
}
