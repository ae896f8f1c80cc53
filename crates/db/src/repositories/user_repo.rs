//! Repository for the `users` table.

use sqlx::PgPool;

use crate::models::user::{UpsertUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, name, avatar_url, created_at, updated_at";

/// Provides read and upsert operations for users. There is no delete path.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by identity-provider subject.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert the user, or overwrite its display attributes if it exists.
    ///
    /// `id` and `created_at` are preserved on conflict.
    pub async fn upsert(pool: &PgPool, input: &UpsertUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, email, name, avatar_url)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.id)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.avatar_url)
            .fetch_one(pool)
            .await
    }
}
