//! Session model and DTOs.

use sqlx::FromRow;
use tracker_core::types::{Timestamp, UserId};

/// A row from the `sessions` table. `id` is the hashed session token.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: String,
    pub user_id: UserId,
    pub claims: serde_json::Value,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub id: String,
    pub user_id: UserId,
    pub claims: serde_json::Value,
    pub expires_at: Timestamp,
}
