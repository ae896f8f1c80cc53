use axum::routing::get;
use axum::Router;

use crate::handlers::issues;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// Authentication is enforced per handler by the `AuthUser` extractor, so
/// the public reads and the protected writes share one path.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(issues::list_issues).post(issues::create_issue))
        .route(
            "/{id}",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
}
