//! Request-body validation for issue writes.
//!
//! Bodies arrive as untyped JSON. [`parse_issue_body`] rejects non-objects and
//! unknown or server-owned keys, then deserializes into [`IssueInput`]. The
//! create and update paths turn that raw input into a typed value or a list
//! of [`FieldError`]s:
//!
//! ```text
//! JSON body -> parse_issue_body -> IssueInput -> validate_create -> NewIssue
//!                                              \-> validate_update -> IssuePatch
//! ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::issue::{
    Impact, IssueStatus, IssueType, ParseEnumError, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
use crate::types::Timestamp;

/// Outcome of validating a request body.
pub type Validated<T> = Result<T, Vec<FieldError>>;

/// Keys a client may send when creating or updating an issue.
pub const WRITABLE_FIELDS: &[&str] = &[
    "title",
    "description",
    "type",
    "impact",
    "status",
    "expectedFixDate",
];

/// Keys that only the server assigns.
pub const SERVER_OWNED_FIELDS: &[&str] = &["id", "createdBy", "updatedBy", "createdAt", "updatedAt"];

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// A single validation failure, reported back to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<Vec<FieldError>> for CoreError {
    fn from(errors: Vec<FieldError>) -> Self {
        CoreError::Validation(errors)
    }
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Issue fields as sent by the client, before enum parsing.
///
/// Every field is optional here; [`validate_create`] decides which are
/// required. `expected_fix_date` distinguishes an absent key (`None`) from an
/// explicit `null` (`Some(None)`).
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IssueInput {
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub impact: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub expected_fix_date: Option<Option<String>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl IssueInput {
    fn trimmed(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }
}

/// Parse an untyped JSON body into [`IssueInput`].
pub fn parse_issue_body(body: serde_json::Value) -> Validated<IssueInput> {
    let Some(object) = body.as_object() else {
        return Err(vec![FieldError::new("body", "must be a JSON object")]);
    };

    let unknown: Vec<FieldError> = object
        .keys()
        .filter(|key| !WRITABLE_FIELDS.contains(&key.as_str()))
        .map(|key| {
            if SERVER_OWNED_FIELDS.contains(&key.as_str()) {
                FieldError::new(key.as_str(), "is assigned by the server and cannot be set")
            } else {
                FieldError::new(key.as_str(), "is not a recognized field")
            }
        })
        .collect();
    if !unknown.is_empty() {
        return Err(sorted(unknown));
    }

    serde_json::from_value(body).map_err(|e| vec![FieldError::new("body", e.to_string())])
}

// ---------------------------------------------------------------------------
// Validated outputs
// ---------------------------------------------------------------------------

/// A fully validated creation payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub impact: Impact,
    pub status: IssueStatus,
    pub expected_fix_date: Option<Timestamp>,
}

/// A validated partial update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<IssueType>,
    pub impact: Option<Impact>,
    pub status: Option<IssueStatus>,
    /// `Some(None)` clears the date.
    pub expected_fix_date: Option<Option<Timestamp>>,
}

// ---------------------------------------------------------------------------
// Validation entry points
// ---------------------------------------------------------------------------

/// Validate a creation payload. `status` defaults to `open`.
pub fn validate_create(input: IssueInput) -> Validated<NewIssue> {
    let input = input.trimmed();
    let mut errors = length_errors(&input);

    if input.title.is_none() {
        errors.push(FieldError::new("title", "is required"));
    }
    if input.description.is_none() {
        errors.push(FieldError::new("description", "is required"));
    }
    let issue_type = required_enum::<IssueType>("type", input.issue_type.as_deref(), &mut errors);
    let impact = required_enum::<Impact>("impact", input.impact.as_deref(), &mut errors);
    let status = optional_enum::<IssueStatus>("status", input.status.as_deref(), &mut errors);
    let expected_fix_date = fix_date(input.expected_fix_date.as_ref(), &mut errors).flatten();

    match (input.title, input.description, issue_type, impact) {
        (Some(title), Some(description), Some(issue_type), Some(impact)) if errors.is_empty() => {
            Ok(NewIssue {
                title,
                description,
                issue_type,
                impact,
                status: status.unwrap_or_default(),
                expected_fix_date,
            })
        }
        _ => Err(sorted(errors)),
    }
}

/// Validate a partial update. Only supplied fields are checked.
pub fn validate_update(input: IssueInput) -> Validated<IssuePatch> {
    let input = input.trimmed();
    let mut errors = length_errors(&input);

    let issue_type = optional_enum::<IssueType>("type", input.issue_type.as_deref(), &mut errors);
    let impact = optional_enum::<Impact>("impact", input.impact.as_deref(), &mut errors);
    let status = optional_enum::<IssueStatus>("status", input.status.as_deref(), &mut errors);
    let expected_fix_date = fix_date(input.expected_fix_date.as_ref(), &mut errors);

    if !errors.is_empty() {
        return Err(sorted(errors));
    }

    Ok(IssuePatch {
        title: input.title,
        description: input.description,
        issue_type,
        impact,
        status,
        expected_fix_date,
    })
}

/// Parse a `status` or `type` query filter.
pub fn parse_filter<T>(field: &str, raw: Option<&str>) -> Result<Option<T>, CoreError>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    let mut errors = Vec::new();
    let parsed = optional_enum::<T>(field, raw.filter(|s| !s.is_empty()), &mut errors);
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(CoreError::Validation(errors))
    }
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_fix_date(raw: &str) -> Result<Timestamp, FieldError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            FieldError::new(
                "expectedFixDate",
                "must be an RFC 3339 timestamp or a YYYY-MM-DD date",
            )
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn length_errors(input: &IssueInput) -> Vec<FieldError> {
    let Err(errors) = input.validate() else {
        return Vec::new();
    };
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter()
                .map(move |e| FieldError::new(field.clone(), describe(e)))
        })
        .collect()
}

/// Human-readable message for a `validator` failure, built from its params.
fn describe(error: &validator::ValidationError) -> String {
    match (error.code.as_ref(), error.params.get("min"), error.params.get("max")) {
        ("length", Some(min), Some(max)) => format!("must be between {min} and {max} characters"),
        _ => error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.code.to_string()),
    }
}

fn required_enum<T>(field: &str, raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<T>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    if raw.is_none() {
        errors.push(FieldError::new(field, "is required"));
        return None;
    }
    optional_enum(field, raw, errors)
}

fn optional_enum<T>(field: &str, raw: Option<&str>, errors: &mut Vec<FieldError>) -> Option<T>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    match raw?.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(FieldError::new(field, e.to_string()));
            None
        }
    }
}

fn fix_date(
    raw: Option<&Option<String>>,
    errors: &mut Vec<FieldError>,
) -> Option<Option<Timestamp>> {
    match raw? {
        None => Some(None),
        Some(s) => match parse_fix_date(s) {
            Ok(ts) => Some(Some(ts)),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    }
}

fn sorted(mut errors: Vec<FieldError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.field.cmp(&b.field));
    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
