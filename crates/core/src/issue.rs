//! Issue enumerations and field limits.
//!
//! The enums serialize to the exact strings stored in the `issues` table and
//! exchanged over the wire (`issue`, `feature-request`, `High`, `open`, ...).
//! Each implements `TryFrom<String>` so the database layer can decode columns
//! with `#[sqlx(try_from = "String")]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

/// Maximum title length (characters).
pub const MAX_TITLE_LENGTH: u64 = 200;
/// Maximum description length (characters).
pub const MAX_DESCRIPTION_LENGTH: u64 = 10_000;

// ---------------------------------------------------------------------------
// Parse error
// ---------------------------------------------------------------------------

/// Returned when a string is not a member of one of the issue enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}. Must be one of: {allowed}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str, allowed: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            allowed: allowed.join(", "),
        }
    }
}

/// Generates `as_str`, `VALUES`, `Display`, `FromStr` and `TryFrom<String>` for
/// a fieldless enum whose variants map one-to-one onto fixed strings.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every accepted string value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError::new($kind, other, Self::VALUES)),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

// ---------------------------------------------------------------------------
// IssueType
// ---------------------------------------------------------------------------

/// Whether a record tracks a defect or a feature request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    #[serde(rename = "issue")]
    Issue,
    #[serde(rename = "feature-request")]
    FeatureRequest,
}

string_enum!(IssueType, "type", {
    Issue => "issue",
    FeatureRequest => "feature-request",
});

// ---------------------------------------------------------------------------
// Impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

string_enum!(Impact, "impact", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

/// Lifecycle status. New issues start as [`IssueStatus::Open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Assigned,
    Closed,
}

string_enum!(IssueStatus, "status", {
    Open => "open",
    Assigned => "assigned",
    Closed => "closed",
});

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_round_trips_through_its_string() {
        for v in IssueType::VALUES {
            assert_eq!(v.parse::<IssueType>().unwrap().as_str(), *v);
        }
        for v in Impact::VALUES {
            assert_eq!(v.parse::<Impact>().unwrap().as_str(), *v);
        }
        for v in IssueStatus::VALUES {
            assert_eq!(v.parse::<IssueStatus>().unwrap().as_str(), *v);
        }
    }

    #[test]
    fn serde_uses_the_same_strings_as_as_str() {
        assert_eq!(
            serde_json::to_value(IssueType::FeatureRequest).unwrap(),
            "feature-request"
        );
        assert_eq!(serde_json::to_value(Impact::Critical).unwrap(), "Critical");
        assert_eq!(serde_json::to_value(IssueStatus::Assigned).unwrap(), "assigned");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("high".parse::<Impact>().is_err());
        assert!("Open".parse::<IssueStatus>().is_err());
        assert!("Feature-Request".parse::<IssueType>().is_err());
    }

    #[test]
    fn parse_error_lists_allowed_values() {
        let err = "urgent".parse::<Impact>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "'urgent' is not a valid impact. Must be one of: Low, Medium, High, Critical"
        );
    }

    #[test]
    fn default_status_is_open() {
        assert_eq!(IssueStatus::default(), IssueStatus::Open);
    }

    #[test]
    fn try_from_string_matches_from_str() {
        assert_eq!(
            IssueStatus::try_from("closed".to_string()).unwrap(),
            IssueStatus::Closed
        );
        assert!(IssueType::try_from("bug".to_string()).is_err());
    }
}
