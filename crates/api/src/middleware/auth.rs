//! Session-cookie authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tracker_core::error::CoreError;
use tracker_core::types::UserId;
use tracker_db::repositories::SessionRepo;

use crate::auth::session::hash_session_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated subject resolved from the session cookie.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication. Extraction fails with 401 before the handler body runs:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    /// Session store key (the hashed token).
    pub session_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.config.session.cookie_name)
            .ok_or_else(|| unauthorized("Missing session cookie"))?;

        let session_id = hash_session_token(token);
        let session = SessionRepo::find_active(&state.pool, &session_id)
            .await?
            .ok_or_else(|| unauthorized("Invalid or expired session"))?;

        Ok(AuthUser {
            user_id: session.user_id,
            session_id,
        })
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

/// Value of the cookie called `name`, searching every `Cookie` header.
///
/// Empty values are treated as absent.
pub fn session_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
