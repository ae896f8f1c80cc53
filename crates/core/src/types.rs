/// Issue primary keys are UUID v7, generated by the application.
pub type IssueId = uuid::Uuid;

/// User ids are the stable subject identifier issued by the identity provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
