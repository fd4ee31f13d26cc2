//! # Page Loader Module
//!
//! Downloads the HTML of each ranked result. A page that cannot be loaded
//! never aborts the run: the failure is recorded on the returned
//! [`PageRecord`] and the page shows up in the report as unavailable.
//!
//! Each URL gets exactly one attempt bounded by the page timeout.

mod error;
mod http;

pub use error::PageFetchError;
pub use http::HttpPageLoader;

use std::future::Future;

use crate::serp::SearchResult;

/// Raw outcome of loading one ranked page
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// The search result the page was loaded for
    pub result: SearchResult,

    /// HTML of the page, or the reason it could not be loaded
    pub body: Result<String, PageFetchError>,
}

impl PageRecord {
    /// A successfully loaded page
    pub fn loaded(result: SearchResult, html: impl Into<String>) -> Self {
        Self {
            result,
            body: Ok(html.into()),
        }
    }

    /// A page that could not be loaded
    pub fn failed(result: SearchResult, error: PageFetchError) -> Self {
        Self {
            result,
            body: Err(error),
        }
    }

    /// Rank of the underlying search result
    pub fn rank(&self) -> usize {
        self.result.rank
    }
}

/// Loads the page behind a search result
pub trait PageLoader {
    /// Make a single attempt at loading the page. Never fails; errors are
    /// carried inside the record.
    fn load(&self, result: SearchResult) -> impl Future<Output = PageRecord> + Send;
}
