//! Handlers for `/auth`.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracker_core::error::CoreError;
use tracker_db::models::user::User;
use tracker_db::repositories::{SessionRepo, UserRepo};

use crate::auth::session::clear_session_cookie;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/auth/user
///
/// Returns the stored profile of the authenticated subject.
pub async fn current_user(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<User>> {
    let user = UserRepo::find_by_id(&state.pool, &auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id.clone(),
            })
        })?;
    Ok(Json(user))
}

/// POST /api/auth/logout
///
/// Ends the current session and clears the cookie.
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    SessionRepo::delete(&state.pool, &auth.session_id).await?;
    tracing::info!(user_id = %auth.user_id, "Session ended");

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, clear_session_cookie(&state.config.session))],
    ))
}
