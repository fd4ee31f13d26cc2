//! Error types for the page loader

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single page could not be loaded
///
/// Stored on the page's row rather than propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PageFetchError {
    /// The request did not finish within the page timeout
    #[error("timed out")]
    Timeout,

    /// The server answered with a non-success status
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection, TLS, redirect or body decoding failure
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for PageFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PageFetchError::Timeout
        } else {
            PageFetchError::Network(err.to_string())
        }
    }
}
