//! Session tokens and cookies.
//!
//! The cookie carries a random plaintext token. Only its SHA-256 digest is
//! stored, as `sessions.id`.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracker_core::types::Timestamp;
use tracker_db::models::session::CreateSession;
use tracker_db::models::user::{UpsertUser, User};
use tracker_db::repositories::{SessionRepo, UserRepo};

use crate::config::SessionConfig;

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// A freshly established session.
#[derive(Debug)]
pub struct SignedIn {
    pub user: User,
    /// Plaintext token. Only ever sent to the client.
    pub token: String,
    pub expires_at: Timestamp,
    /// Ready-to-send `Set-Cookie` header value.
    pub cookie: String,
}

/// Generate a new session token, returning `(plaintext, hash)`.
pub fn generate_session_token() -> (String, String) {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    let plaintext = hex(&bytes);
    let hash = hash_session_token(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a session token.
///
/// Use this to look up an incoming cookie value in the session store.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Record a verified identity-provider login.
///
/// Upserts the user profile and opens a session that expires after the
/// configured TTL. `claims` is stored verbatim alongside the session.
pub async fn sign_in(
    pool: &PgPool,
    config: &SessionConfig,
    profile: &UpsertUser,
    claims: serde_json::Value,
) -> Result<SignedIn, sqlx::Error> {
    let user = UserRepo::upsert(pool, profile).await?;

    let (token, hash) = generate_session_token();
    let expires_at = Utc::now() + Duration::hours(config.ttl_hours);
    SessionRepo::create(
        pool,
        &CreateSession {
            id: hash,
            user_id: user.id.clone(),
            claims,
            expires_at,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, %expires_at, "Session created");

    let cookie = session_cookie(config, &token);
    Ok(SignedIn {
        user,
        token,
        expires_at,
        cookie,
    })
}

/// `Set-Cookie` value carrying `token`.
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    build_cookie(config, token, config.ttl_hours * 3600)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    build_cookie(config, "", 0)
}

fn build_cookie(config: &SessionConfig, value: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
        config.cookie_name
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}
