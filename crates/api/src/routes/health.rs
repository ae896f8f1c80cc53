use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Mirror target: `sheets` or `memory`.
    pub mirror: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let db_healthy = match tracker_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    Json(HealthReport {
        status: if db_healthy {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        mirror: if state.config.sheets.is_some() {
            "sheets"
        } else {
            "memory"
        },
    })
}

/// `/health`, mounted at the root rather than under `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
