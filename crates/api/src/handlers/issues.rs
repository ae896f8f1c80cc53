//! Handlers for the `/issues` resource.
//!
//! Reads are public and serialize [`PublicIssue`]. Writes require a session,
//! return the full record, and queue a mirror sync once the store commits.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use tracker_core::error::CoreError;
use tracker_core::issue::{IssueStatus, IssueType};
use tracker_core::search::normalize_search;
use tracker_core::types::IssueId;
use tracker_core::validation::{parse_filter, parse_issue_body, validate_create, validate_update};
use tracker_db::models::issue::{IssueFilter, IssueListParams, PublicIssue};
use tracker_db::repositories::IssueRepo;
use tracker_sync::SyncOperation;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Public reads
// ---------------------------------------------------------------------------

/// GET /api/issues?status=&type=&search=
pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> AppResult<Json<Vec<PublicIssue>>> {
    let filter = IssueFilter {
        status: parse_filter::<IssueStatus>("status", params.status.as_deref())?,
        issue_type: parse_filter::<IssueType>("type", params.issue_type.as_deref())?,
        search: normalize_search(params.search.as_deref()),
    };

    let issues = IssueRepo::list(&state.pool, &filter).await?;
    Ok(Json(issues.into_iter().map(PublicIssue::from).collect()))
}

/// GET /api/issues/{id}
pub async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PublicIssue>> {
    let id = parse_issue_id(&id)?;
    let issue = IssueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(issue.into()))
}

// ---------------------------------------------------------------------------
// Authenticated writes
// ---------------------------------------------------------------------------

/// POST /api/issues
pub async fn create_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body?;
    let input = parse_issue_body(body)
        .and_then(validate_create)
        .map_err(CoreError::Validation)?;

    let issue = IssueRepo::create(&state.pool, &auth.user_id, &input).await?;
    tracing::info!(issue_id = %issue.id, user_id = %auth.user_id, "Issue created");

    state.mirror.sync_issue(&issue, SyncOperation::Create);
    Ok((StatusCode::CREATED, Json(issue)))
}

/// PUT /api/issues/{id}
pub async fn update_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = parse_issue_id(&id)?;
    let Json(body) = body?;
    let patch = parse_issue_body(body)
        .and_then(validate_update)
        .map_err(CoreError::Validation)?;

    let issue = IssueRepo::update(&state.pool, id, &auth.user_id, &patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(issue_id = %issue.id, user_id = %auth.user_id, "Issue updated");

    state.mirror.sync_issue(&issue, SyncOperation::Update);
    Ok(Json(issue))
}

/// DELETE /api/issues/{id}
pub async fn delete_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_issue_id(&id)?;
    // The mirror job needs the record, so read it before deleting.
    let issue = IssueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !IssueRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(issue_id = %id, user_id = %auth.user_id, "Issue deleted");

    state.mirror.sync_issue(&issue, SyncOperation::Delete);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A path id that is not a UUID cannot name an issue, so it is a 404.
fn parse_issue_id(raw: &str) -> Result<IssueId, AppError> {
    raw.parse().map_err(|_| {
        AppError::Core(CoreError::NotFound {
            entity: "Issue",
            id: raw.to_string(),
        })
    })
}

fn not_found(id: IssueId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Issue",
        id: id.to_string(),
    })
}
