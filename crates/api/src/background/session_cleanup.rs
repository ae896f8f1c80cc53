//! Periodic purge of expired sessions.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracker_db::repositories::SessionRepo;

/// Delete expired sessions every `interval` until `cancel` fires.
///
/// The first purge runs immediately.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Session cleanup job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => purge(&pool).await,
        }
    }
}

async fn purge(pool: &PgPool) {
    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
        Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged expired sessions"),
        Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
    }
}
