//! # Search Results Module
//!
//! The first stage of the pipeline: one query to the search-results API for a
//! keyword, returning the organic results in ranking order.
//!
//! ## Key Components
//!
//! - `SearchResult`: one ranked organic result
//! - `SearchProvider`: the seam the pipeline depends on, so tests can swap
//!   the real API for a fake
//! - `SerpClient`: the SerpAPI implementation
//!
//! There are no retries. A failed call surfaces to the caller, which aborts
//! the run.

mod client;
mod error;

pub use client::SerpClient;
pub use error::SerpError;

use std::future::Future;

use serde::{Deserialize, Serialize};

/// One organic search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based position in the API's result order
    pub rank: usize,

    /// URL of the ranking page
    pub url: String,

    /// Title shown on the results page
    pub title: String,

    /// Snippet shown on the results page
    pub snippet: String,
}

/// Source of ranked search results for a keyword
pub trait SearchProvider {
    /// Run one search and return the results ordered by rank
    fn search(
        &self,
        keyword: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SerpError>> + Send;
}
