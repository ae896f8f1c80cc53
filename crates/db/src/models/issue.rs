//! Issue entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracker_core::issue::{Impact, IssueStatus, IssueType};
use tracker_core::types::{IssueId, Timestamp, UserId};

/// A row from the `issues` table.
///
/// This is the full record, including the actor fields. Public read routes
/// must serialize [`PublicIssue`] instead.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(try_from = "String")]
    pub issue_type: IssueType,
    #[sqlx(try_from = "String")]
    pub impact: Impact,
    #[sqlx(try_from = "String")]
    pub status: IssueStatus,
    pub expected_fix_date: Option<Timestamp>,
    pub created_by: UserId,
    pub updated_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An issue with the actor-identifying fields removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIssue {
    pub id: IssueId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub impact: Impact,
    pub status: IssueStatus,
    pub expected_fix_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Issue> for PublicIssue {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title,
            description: issue.description,
            issue_type: issue.issue_type,
            impact: issue.impact,
            status: issue.status,
            expected_fix_date: issue.expected_fix_date,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Query parameters for listing issues (`?status=&type=&search=`).
#[derive(Debug, Default, Deserialize)]
pub struct IssueListParams {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub search: Option<String>,
}

/// Parsed list filters. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub issue_type: Option<IssueType>,
    /// Already trimmed; matched as a case-insensitive substring.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample() -> Issue {
        let now = Utc::now();
        Issue {
            id: uuid::Uuid::now_v7(),
            title: "Crash on save".into(),
            description: "Editor crashes".into(),
            issue_type: IssueType::Issue,
            impact: Impact::High,
            status: IssueStatus::Open,
            expected_fix_date: None,
            created_by: "u1".into(),
            updated_by: "u2".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn full_issue_serializes_camel_case_with_actor_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "issue");
        assert_eq!(json["createdBy"], "u1");
        assert_eq!(json["updatedBy"], "u2");
        assert!(json.get("expectedFixDate").is_some());
        assert!(json.get("issue_type").is_none());
    }

    #[test]
    fn public_issue_has_no_actor_fields() {
        let json = serde_json::to_value(PublicIssue::from(sample())).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("createdBy"));
        assert!(!object.contains_key("updatedBy"));
        assert_eq!(json["title"], "Crash on save");
        assert_eq!(json["impact"], "High");
    }
}
