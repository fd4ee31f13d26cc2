//! Error types for the search module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for search API operations
#[derive(Debug, Error)]
pub enum SerpError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the key
    #[error("Authentication error: {0}")]
    Auth(String),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// The response body was not the expected JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The keyword was empty
    #[error("Empty search keyword")]
    EmptyKeyword,
}

impl From<SerpError> for CrateError {
    fn from(err: SerpError) -> Self {
        match err {
            SerpError::Auth(message) => CrateError::Auth(message),
            SerpError::EmptyKeyword => CrateError::InvalidRequest(err.to_string()),
            _ => CrateError::ExternalService(err.to_string()),
        }
    }
}
