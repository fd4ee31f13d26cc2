//! Error types for the pagecompare crate

use thiserror::Error;

/// Result type for pagecompare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pagecompare operations
///
/// Only run-level failures live here. A page that cannot be fetched is not an
/// error for the run; it is recorded inline as a
/// [`PageFetchError`](crate::loader::PageFetchError) on its row.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or rejected search API key
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The search API was unreachable or returned something unusable
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by the API key
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions_keep_their_kind() {
        let io: Error = std::io::Error::other("disk full").into();
        assert!(matches!(io, Error::Io(_)));
        assert_eq!(io.to_string(), "IO error: disk full");

        let json: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(json, Error::Json(_)));
        assert!(!json.is_auth());

        assert!(Error::Auth("no key".to_string()).is_auth());
    }
}
