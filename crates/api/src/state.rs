use std::sync::Arc;

use tracker_sync::MirrorSync;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tracker_db::DbPool,
    /// Server configuration, built once at startup.
    pub config: Arc<ServerConfig>,
    /// Queue handle for spreadsheet mirror writes.
    pub mirror: MirrorSync,
}
