/// Error type for mirror writes.
///
/// These never reach an HTTP caller: the dispatcher logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The spreadsheet API returned a non-2xx status code.
    #[error("Spreadsheet API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx response did not have the expected shape.
    #[error("Unexpected spreadsheet response: {0}")]
    UnexpectedResponse(String),

    /// The configured API base URL cannot carry path segments.
    #[error("Invalid spreadsheet API URL: {0}")]
    InvalidUrl(String),

    /// The mirror refused the operation.
    #[error("Mirror unavailable: {0}")]
    Unavailable(String),
}
