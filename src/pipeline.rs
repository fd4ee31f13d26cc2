//! # Analysis Pipeline
//!
//! Wires the stages together for one keyword: search, classify by URL, load,
//! extract, refine the page type from the content, compare. Page loads run through a bounded pool (one at a time by
//! default) and come back in rank order no matter which finishes first.

use std::time::Duration;

use futures::future;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument};

use crate::compare::{ComparisonReport, FeatureRecord, compare};
use crate::config::{AnalyzerConfig, ApiKey};
use crate::error::{Error, Result};
use crate::extract::{ContentClassifier, FeatureExtractor, HtmlExtractor, PageType};
use crate::loader::{HttpPageLoader, PageFetchError, PageLoader, PageRecord};
use crate::serp::{SearchProvider, SearchResult, SerpClient};

/// Sent once per page as soon as its load finishes
#[derive(Debug, Clone, PartialEq)]
pub struct PageProgress {
    pub rank: usize,
    pub url: String,
    /// Number of pages being loaded in this run
    pub total: usize,
    /// Why the page could not be loaded, if it failed
    pub error: Option<PageFetchError>,
}

/// Keyword analysis over pluggable search, loading and extraction stages
pub struct Pipeline<S, L, X> {
    search: S,
    loader: L,
    extractor: X,
    classifier: ContentClassifier,
    concurrency: usize,
    rate_limit: Duration,
    progress: Option<mpsc::Sender<PageProgress>>,
}

/// The pipeline backed by SerpAPI, HTTP page loads and the HTML extractor
pub type DefaultPipeline = Pipeline<SerpClient, HttpPageLoader, HtmlExtractor>;

impl DefaultPipeline {
    /// Build the real stages from an API key and the run configuration
    pub fn from_config(api_key: ApiKey, config: &AnalyzerConfig) -> Result<Self> {
        let search = SerpClient::new(api_key, config)?;
        let loader = HttpPageLoader::new(config)?;
        let extractor = HtmlExtractor::from_config(config);
        Ok(Pipeline::new(search, loader, extractor, config))
    }
}

impl<S, L, X> Pipeline<S, L, X>
where
    S: SearchProvider + Sync,
    L: PageLoader + Sync,
    X: FeatureExtractor + Sync,
{
    /// Create a pipeline from its stages. The config supplies the
    /// concurrency, rate limit and page classification phrases.
    pub fn new(search: S, loader: L, extractor: X, config: &AnalyzerConfig) -> Self {
        Self {
            search,
            loader,
            extractor,
            classifier: ContentClassifier::from_config(config),
            concurrency: config.concurrency.clamp(1, Semaphore::MAX_PERMITS),
            rate_limit: config.rate_limit(),
            progress: None,
        }
    }

    /// Report each finished page load on the given channel
    pub fn with_progress(mut self, sender: mpsc::Sender<PageProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Run the full analysis for a keyword.
    ///
    /// Fails only when the keyword is empty or the search itself fails.
    /// Pages that cannot be loaded become unavailable rows.
    #[instrument(skip(self))]
    pub async fn run(&self, keyword: &str) -> Result<ComparisonReport> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::InvalidRequest("keyword must not be empty".to_string()));
        }

        info!("Searching for '{}'", keyword);
        let results = self.search.search(keyword).await?;
        info!("Found {} ranked results", results.len());

        let page_types: Vec<PageType> = results
            .iter()
            .map(|result| PageType::classify(&result.url, keyword))
            .collect();

        let records = self.load_all(results).await;

        let rows: Vec<FeatureRecord> = records
            .into_iter()
            .zip(page_types)
            .map(|(record, page_type)| {
                let mut row = FeatureRecord::from_page(record, page_type, &self.extractor);
                if let Some(features) = row.features() {
                    let refined = self.classifier.refine(row.page_type, features, keyword);
                    if refined != row.page_type {
                        debug!(
                            "Rank {} reclassified from {} to {}",
                            row.rank, row.page_type, refined
                        );
                    }
                    row.page_type = refined;
                }
                row
            })
            .collect();

        let report = compare(keyword, rows);
        info!(
            "Compared {} pages, {} unavailable",
            report.rows.len(),
            report.unavailable().count()
        );
        Ok(report)
    }

    /// Load every page with at most `concurrency` loads in flight.
    /// Output order matches input order.
    async fn load_all(&self, results: Vec<SearchResult>) -> Vec<PageRecord> {
        let semaphore = Semaphore::new(self.concurrency);
        let semaphore = &semaphore;
        let total = results.len();

        let tasks = results.into_iter().enumerate().map(|(index, result)| async move {
            // The semaphore is never closed, so acquiring cannot fail
            let _permit = semaphore.acquire().await.ok();

            if index > 0 && !self.rate_limit.is_zero() {
                tokio::time::sleep(self.rate_limit).await;
            }

            let record = self.loader.load(result).await;
            self.report_progress(&record, total).await;
            record
        });

        future::join_all(tasks).await
    }

    async fn report_progress(&self, record: &PageRecord, total: usize) {
        let Some(sender) = &self.progress else {
            return;
        };
        let progress = PageProgress {
            rank: record.rank(),
            url: record.result.url.clone(),
            total,
            error: record.body.as_ref().err().cloned(),
        };
        if sender.send(progress).await.is_err() {
            debug!("Progress receiver dropped");
        }
    }
}

/// Analyze a keyword with the real search API and page loader.
///
/// The API key is checked before anything else; a missing or placeholder
/// key fails with [`Error::Auth`] without touching the network.
pub async fn analyze_keyword(
    keyword: &str,
    config: &AnalyzerConfig,
    api_key: Option<String>,
) -> Result<ComparisonReport> {
    let api_key = ApiKey::from_option(api_key)?;
    DefaultPipeline::from_config(api_key, config)?
        .run(keyword)
        .await
}
