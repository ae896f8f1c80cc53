pub mod auth;
pub mod health;
pub mod issues;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/user                  current user (auth)
/// /auth/logout                end session (auth)
///
/// /issues                     list (public), create (auth)
/// /issues/{id}                get (public), update, delete (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/issues", issues::router())
}
