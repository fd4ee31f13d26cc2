//! # pagecompare - Ranking Page Structure Comparison
//!
//! This crate looks up the pages ranking for a search keyword through SerpAPI,
//! downloads them and compares their structure: heading counts per level,
//! visible word count, schema.org markup, title and meta description, and the
//! content elements a procedure page tends to carry.
//!
//! ## Features
//!
//! - One SerpAPI query per keyword, results kept in rank order
//! - Bounded page downloads; a failed page becomes an unavailable row
//! - HTML structure extraction that never fails on broken markup
//! - Aggregates, baseline deltas and content coverage across the pages
//! - Text, JSON and HTML reports, plus a minimal local web page
//!
//! ## Example
//!
//! ```rust,no_run
//! use pagecompare::config::AnalyzerConfig;
//! use pagecompare::pipeline::analyze_keyword;
//! use pagecompare::report::render_text;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalyzerConfig::builder().num_results(5).build();
//!     let api_key = std::env::var("SERPAPI_KEY").ok();
//!
//!     let report = analyze_keyword("knee replacement", &config, api_key).await?;
//!     println!("{}", render_text(&report));
//!     Ok(())
//! }
//! ```

mod error;

pub mod compare;
pub mod config;
pub mod extract;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod serp;
pub mod web;

pub use error::{Error, Result};

/// Re-export of the types most callers need
pub mod prelude {
    pub use crate::compare::{ComparisonReport, FeatureOutcome, FeatureRecord};
    pub use crate::config::{AnalyzerConfig, ApiKey};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::extract::{FeatureExtractor, HtmlExtractor, PageFeatures};
    pub use crate::pipeline::{Pipeline, analyze_keyword};
}
