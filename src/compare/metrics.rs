//! Numeric metrics and their aggregates

use serde::{Deserialize, Serialize};

use crate::extract::PageFeatures;

/// A numeric page metric that can be averaged and compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    WordCount,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    TotalHeadings,
    RichnessScore,
}

impl Metric {
    /// Every metric, in report order
    pub const ALL: [Metric; 9] = [
        Metric::WordCount,
        Metric::H1,
        Metric::H2,
        Metric::H3,
        Metric::H4,
        Metric::H5,
        Metric::H6,
        Metric::TotalHeadings,
        Metric::RichnessScore,
    ];

    /// Read this metric from a page
    pub fn value(&self, features: &PageFeatures) -> f64 {
        let counts = &features.heading_counts;
        match self {
            Metric::WordCount => features.word_count as f64,
            Metric::H1 => counts.h1 as f64,
            Metric::H2 => counts.h2 as f64,
            Metric::H3 => counts.h3 as f64,
            Metric::H4 => counts.h4 as f64,
            Metric::H5 => counts.h5 as f64,
            Metric::H6 => counts.h6 as f64,
            Metric::TotalHeadings => counts.total() as f64,
            Metric::RichnessScore => features.richness_score,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::WordCount => "Words",
            Metric::H1 => "H1",
            Metric::H2 => "H2",
            Metric::H3 => "H3",
            Metric::H4 => "H4",
            Metric::H5 => "H5",
            Metric::H6 => "H6",
            Metric::TotalHeadings => "Headings",
            Metric::RichnessScore => "Richness",
        }
    }
}

/// Mean and maximum of one metric across the extracted pages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub mean: f64,
    pub max: f64,
}

/// Difference between a page and the baseline for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub delta: f64,
}

/// Metric deltas of one extracted row against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDelta {
    pub rank: usize,
    pub deltas: Vec<MetricDelta>,
}

impl RowDelta {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.deltas
            .iter()
            .find(|d| d.metric == metric)
            .map(|d| d.delta)
    }
}

/// Aggregates over the pages that were fetched and extracted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    /// Number of pages the aggregates cover
    pub pages: usize,

    /// Mean and max per metric, in `Metric::ALL` order
    pub metrics: Vec<MetricSummary>,

    /// Fraction of pages with schema.org markup, 0 to 1
    pub schema_share: f64,

    /// Fraction of pages with a `<title>`
    pub title_share: f64,

    /// Fraction of pages with a meta description
    pub meta_description_share: f64,
}

impl Aggregates {
    /// Aggregate the given pages. `None` when there are no pages.
    pub fn from_pages(pages: &[&PageFeatures]) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        let n = pages.len() as f64;

        let metrics = Metric::ALL
            .iter()
            .map(|metric| {
                let values = pages.iter().map(|page| metric.value(page));
                let (sum, max) = values.fold((0.0, f64::MIN), |(sum, max), v| (sum + v, max.max(v)));
                MetricSummary {
                    metric: *metric,
                    mean: sum / n,
                    max,
                }
            })
            .collect();

        let share = |predicate: fn(&PageFeatures) -> bool| {
            pages.iter().filter(|page| predicate(page)).count() as f64 / n
        };

        Some(Self {
            pages: pages.len(),
            metrics,
            schema_share: share(|p| p.has_schema_markup),
            title_share: share(|p| p.has_title),
            meta_description_share: share(|p| p.has_meta_description),
        })
    }

    pub fn summary(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|s| s.metric == metric)
    }

    /// Mean of a metric
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.summary(metric).map(|s| s.mean)
    }

    /// Maximum of a metric
    pub fn max(&self, metric: Metric) -> Option<f64> {
        self.summary(metric).map(|s| s.max)
    }
}

/// Per-metric deltas of a page against the baseline page
pub fn deltas(rank: usize, page: &PageFeatures, baseline: &PageFeatures) -> RowDelta {
    RowDelta {
        rank,
        deltas: Metric::ALL
            .iter()
            .map(|metric| MetricDelta {
                metric: *metric,
                delta: metric.value(page) - metric.value(baseline),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HeadingCounts;

    fn page(words: usize, h2: usize, schema: bool) -> PageFeatures {
        PageFeatures {
            word_count: words,
            heading_counts: HeadingCounts {
                h1: 1,
                h2,
                ..Default::default()
            },
            has_schema_markup: schema,
            has_title: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_pages_has_no_aggregates() {
        assert_eq!(Aggregates::from_pages(&[]), None);
    }

    #[test]
    fn test_mean_max_and_shares() {
        let a = page(1000, 4, true);
        let b = page(500, 2, false);
        let aggregates = Aggregates::from_pages(&[&a, &b]).unwrap();

        assert_eq!(aggregates.pages, 2);
        assert_eq!(aggregates.mean(Metric::WordCount), Some(750.0));
        assert_eq!(aggregates.max(Metric::WordCount), Some(1000.0));
        assert_eq!(aggregates.mean(Metric::H2), Some(3.0));
        assert_eq!(aggregates.mean(Metric::TotalHeadings), Some(4.0));
        assert_eq!(aggregates.max(Metric::H6), Some(0.0));
        assert_eq!(aggregates.schema_share, 0.5);
        assert_eq!(aggregates.title_share, 1.0);
        assert_eq!(aggregates.meta_description_share, 0.0);
    }

    #[test]
    fn test_deltas_against_baseline() {
        let baseline = page(1000, 4, true);
        let other = page(400, 6, false);

        let row = deltas(3, &other, &baseline);
        assert_eq!(row.rank, 3);
        assert_eq!(row.get(Metric::WordCount), Some(-600.0));
        assert_eq!(row.get(Metric::H2), Some(2.0));
        assert_eq!(row.get(Metric::H1), Some(0.0));
        assert_eq!(row.deltas.len(), Metric::ALL.len());
    }
}
