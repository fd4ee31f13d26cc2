//! # Comparison Module
//!
//! Builds the [`ComparisonReport`] for one keyword from the per-page feature
//! records. Rows stay in search rank order. Aggregates, coverage and deltas
//! only look at pages that were fetched and extracted; unavailable pages are
//! kept as rows so the report can show what failed.
//!
//! The baseline is the top-ranked page that loaded. When rank 1 failed, the
//! next extracted page takes its place.
//!
//! Content coverage and the section order only count qualifying pages
//! (service pages and procedure+location pages). Homepages, geo pages and
//! blog posts rank for other reasons and would skew what looks standard.

mod coverage;
mod metrics;
mod sections;

pub use coverage::{ElementCoverage, Priority, coverage, is_differentiator};
pub use metrics::{Aggregates, Metric, MetricDelta, MetricSummary, RowDelta, deltas};
pub use sections::SectionOrder;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::extract::{ContentElement, FeatureExtractor, PageFeatures, PageType};
use crate::loader::{PageFetchError, PageRecord};

/// What came out of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeatureOutcome {
    /// The page loaded and was extracted
    Extracted(PageFeatures),
    /// The page could not be fetched
    Unavailable { error: PageFetchError },
}

/// One row of the comparison: a ranked page and its features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub rank: usize,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub page_type: PageType,
    pub outcome: FeatureOutcome,
}

impl FeatureRecord {
    /// Extract a loaded page, or carry the fetch error forward
    pub fn from_page<X: FeatureExtractor>(
        record: PageRecord,
        page_type: PageType,
        extractor: &X,
    ) -> Self {
        let outcome = match &record.body {
            Ok(html) => FeatureOutcome::Extracted(extractor.extract_page(html, &record.result.url)),
            Err(error) => FeatureOutcome::Unavailable {
                error: error.clone(),
            },
        };
        let result = record.result;

        Self {
            rank: result.rank,
            url: result.url,
            title: result.title,
            snippet: result.snippet,
            page_type,
            outcome,
        }
    }

    /// Features, if the page was extracted
    pub fn features(&self) -> Option<&PageFeatures> {
        match &self.outcome {
            FeatureOutcome::Extracted(features) => Some(features),
            FeatureOutcome::Unavailable { .. } => None,
        }
    }

    /// Fetch error, if the page was unavailable
    pub fn error(&self) -> Option<&PageFetchError> {
        match &self.outcome {
            FeatureOutcome::Extracted(_) => None,
            FeatureOutcome::Unavailable { error } => Some(error),
        }
    }

    pub fn is_available(&self) -> bool {
        self.features().is_some()
    }
}

/// Comparison of the pages ranking for one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// The searched keyword
    pub query: String,

    pub generated_at: DateTime<Utc>,

    /// One row per search result, in rank order
    pub rows: Vec<FeatureRecord>,

    /// `None` when no page could be extracted
    pub aggregates: Option<Aggregates>,

    /// Rank of the page the deltas are measured against
    pub baseline_rank: Option<usize>,

    /// Per-row deltas against the baseline, extracted rows only
    pub deltas: Vec<RowDelta>,

    /// Extracted pages of a qualifying type
    pub qualifying_pages: usize,

    /// Content elements no qualifying page has
    pub gaps: Vec<ContentElement>,

    /// Coverage across the qualifying pages
    pub coverage: Vec<ElementCoverage>,

    /// Elements the baseline has that some qualifying competitors lack.
    /// Empty when the baseline is not itself a qualifying page.
    pub differentiators: Vec<ContentElement>,

    /// H2 outlines of the qualifying pages
    pub section_order: SectionOrder,
}

impl ComparisonReport {
    /// Rows whose page was extracted
    pub fn extracted(&self) -> impl Iterator<Item = (&FeatureRecord, &PageFeatures)> {
        self.rows
            .iter()
            .filter_map(|row| row.features().map(|features| (row, features)))
    }

    /// Rows whose page could not be fetched
    pub fn unavailable(&self) -> impl Iterator<Item = (&FeatureRecord, &PageFetchError)> {
        self.rows
            .iter()
            .filter_map(|row| row.error().map(|error| (row, error)))
    }

    pub fn baseline(&self) -> Option<&FeatureRecord> {
        let rank = self.baseline_rank?;
        self.rows.iter().find(|row| row.rank == rank)
    }

    /// Deltas for a row, if it was extracted
    pub fn delta_for(&self, rank: usize) -> Option<&RowDelta> {
        self.deltas.iter().find(|d| d.rank == rank)
    }

    /// The top page is a homepage or geo page, so it likely ranks on domain
    /// authority rather than on content
    pub fn authority_driven(&self) -> bool {
        self.baseline().is_some_and(|row| {
            matches!(row.page_type, PageType::Homepage | PageType::GeoPage)
        })
    }
}

/// Compare the feature records of one keyword
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn compare(query: &str, rows: Vec<FeatureRecord>) -> ComparisonReport {
    let extracted: Vec<(usize, &PageFeatures)> = rows
        .iter()
        .filter_map(|row| row.features().map(|features| (row.rank, features)))
        .collect();
    let pages: Vec<&PageFeatures> = extracted.iter().map(|(_, features)| *features).collect();

    let aggregates = Aggregates::from_pages(&pages);

    let (baseline_rank, deltas) = match extracted.first() {
        Some((baseline_rank, baseline)) => {
            let deltas = extracted
                .iter()
                .map(|(rank, page)| metrics::deltas(*rank, page, baseline))
                .collect();
            (Some(*baseline_rank), deltas)
        }
        None => (None, Vec::new()),
    };

    let qualifying: Vec<(usize, &PageFeatures)> = rows
        .iter()
        .filter(|row| row.page_type.is_qualifying())
        .filter_map(|row| row.features().map(|features| (row.rank, features)))
        .collect();

    // Differentiators are measured from the baseline only when it qualifies
    let (coverage_baseline, coverage_others): (Option<&PageFeatures>, Vec<&PageFeatures>) =
        match qualifying.split_first() {
            Some(((rank, first), rest)) if Some(*rank) == baseline_rank => {
                (Some(*first), rest.iter().map(|(_, page)| *page).collect())
            }
            _ => (None, qualifying.iter().map(|(_, page)| *page).collect()),
        };
    let coverage = coverage(coverage_baseline, &coverage_others);

    let differentiators = coverage
        .iter()
        .filter(|c| c.priority == Priority::Differentiator)
        .map(|c| c.element)
        .collect();
    let gaps = coverage
        .iter()
        .filter(|c| c.priority == Priority::GapOpportunity)
        .map(|c| c.element)
        .collect();

    debug!(
        "Compared {} of {} pages ({} qualifying), baseline rank {:?}",
        pages.len(),
        rows.len(),
        qualifying.len(),
        baseline_rank
    );

    let qualifying_pages = qualifying.len();
    let section_order = SectionOrder::from_pages(&qualifying);

    ComparisonReport {
        query: query.to_string(),
        generated_at: Utc::now(),
        rows,
        aggregates,
        baseline_rank,
        deltas,
        qualifying_pages,
        gaps,
        coverage,
        differentiators,
        section_order,
    }
}
