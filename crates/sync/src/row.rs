//! Mirror row layout.

use std::fmt;

use chrono::SecondsFormat;
use tracker_core::types::Timestamp;
use tracker_db::models::issue::Issue;

/// Column headers, in sheet order. Column A is the row key.
pub const HEADER: [&str; 11] = [
    "id",
    "title",
    "description",
    "type",
    "impact",
    "status",
    "expectedFixDate",
    "createdBy",
    "updatedBy",
    "createdAt",
    "updatedAt",
];

/// Letter of the last header column (`K` for eleven columns).
pub const LAST_COLUMN: char = (b'A' + HEADER.len() as u8 - 1) as char;

/// The mutation that triggered a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        })
    }
}

/// Header row as owned strings.
pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|h| h.to_string()).collect()
}

/// Flatten an issue into cell values matching [`HEADER`].
pub fn issue_row(issue: &Issue) -> Vec<String> {
    vec![
        issue.id.to_string(),
        issue.title.clone(),
        issue.description.clone(),
        issue.issue_type.to_string(),
        issue.impact.to_string(),
        issue.status.to_string(),
        issue.expected_fix_date.map(format_ts).unwrap_or_default(),
        issue.created_by.clone(),
        issue.updated_by.clone(),
        format_ts(issue.created_at),
        format_ts(issue.updated_at),
    ]
}

fn format_ts(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
