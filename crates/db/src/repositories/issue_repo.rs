//! Repository for the `issues` table.

use sqlx::PgPool;
use tracker_core::search::contains_pattern;
use tracker_core::types::IssueId;
use tracker_core::validation::{IssuePatch, NewIssue};
use uuid::Uuid;

use crate::models::issue::{Issue, IssueFilter};

/// Column list for `issues` queries.
const COLUMNS: &str = "\
    id, title, description, issue_type, impact, status, expected_fix_date, \
    created_by, updated_by, created_at, updated_at";

/// Provides CRUD operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Insert a new issue authored by `actor`, returning the full row.
    ///
    /// The id is a fresh UUID v7; both actor columns are set to `actor` and
    /// both timestamps to the same `NOW()`.
    pub async fn create(pool: &PgPool, actor: &str, input: &NewIssue) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues \
                (id, title, description, issue_type, impact, status, expected_fix_date, \
                 created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(Uuid::now_v7())
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.issue_type.as_str())
            .bind(input.impact.as_str())
            .bind(input.status.as_str())
            .bind(input.expected_fix_date)
            .bind(actor)
            .fetch_one(pool)
            .await
    }

    /// Find an issue by ID.
    pub async fn find_by_id(pool: &PgPool, id: IssueId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List issues matching every filter that is set.
    ///
    /// Results are in creation order (`created_at`, then `id`).
    pub async fn list(pool: &PgPool, filter: &IssueFilter) -> Result<Vec<Issue>, sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if filter.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if filter.issue_type.is_some() {
            conditions.push(format!("issue_type = ${param_idx}"));
            param_idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(title ILIKE ${param_idx} ESCAPE '\\' OR description ILIKE ${param_idx} ESCAPE '\\')"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query =
            format!("SELECT {COLUMNS} FROM issues {where_clause} ORDER BY created_at ASC, id ASC");

        let mut q = sqlx::query_as::<_, Issue>(&query);

        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(issue_type) = filter.issue_type {
            q = q.bind(issue_type.as_str());
        }
        if let Some(search) = &filter.search {
            q = q.bind(contains_pattern(search));
        }

        q.fetch_all(pool).await
    }

    /// Apply a partial update on behalf of `actor`.
    ///
    /// Only `Some` fields in `patch` are written. `updated_by` and
    /// `updated_at` are always refreshed; `created_*` are never touched.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: IssueId,
        actor: &str,
        patch: &IssuePatch,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                issue_type = COALESCE($4, issue_type),
                impact = COALESCE($5, impact),
                status = COALESCE($6, status),
                expected_fix_date = CASE WHEN $7 THEN $8 ELSE expected_fix_date END,
                updated_by = $9,
                updated_at = GREATEST(NOW(), created_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(patch.title.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.issue_type.map(|t| t.as_str()))
            .bind(patch.impact.map(|i| i.as_str()))
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.expected_fix_date.is_some())
            .bind(patch.expected_fix_date.flatten())
            .bind(actor)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an issue. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: IssueId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
