use async_trait::async_trait;

use crate::error::SyncError;

/// Operations a mirror target must support.
///
/// Implementations may assume calls are never concurrent: the dispatcher
/// drives a single client from one worker task.
#[async_trait]
pub trait MirrorClient: Send + Sync {
    /// Create the worksheet and header row if they are missing. Safe to repeat.
    async fn ensure_initialized(&self) -> Result<(), SyncError>;

    /// Overwrite the row keyed by `id`, or append it if absent.
    async fn upsert_row(&self, id: &str, row: &[String]) -> Result<(), SyncError>;

    /// Remove the row keyed by `id`. Absent rows are not an error.
    async fn delete_row(&self, id: &str) -> Result<(), SyncError>;
}
