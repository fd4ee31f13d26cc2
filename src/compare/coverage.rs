//! Content element coverage across the ranking pages

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extract::{ContentElement, PageFeatures};

/// Share above which an element counts as table stakes
const MUST_HAVE_PERCENTAGE: f64 = 50.0;

/// How much weight a content element deserves on a new page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// The baseline page has it and some competitors do not
    Differentiator,
    /// Present on more than half of the pages
    MustHave,
    Consider,
    /// No ranking page has it
    GapOpportunity,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Differentiator => "Differentiator",
            Priority::MustHave => "Must Have",
            Priority::Consider => "Consider",
            Priority::GapOpportunity => "Gap Opportunity",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How many qualifying pages carry a content element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementCoverage {
    pub element: ContentElement,
    pub count: usize,
    pub total: usize,
    /// `count / total` as a percentage with one decimal
    pub percentage: f64,
    pub priority: Priority,
}

/// Coverage of every content element, in `ContentElement::ALL` order.
///
/// `baseline` is counted along with `others`; without one no element can be
/// a differentiator. No pages at all yields no coverage.
pub fn coverage(
    baseline: Option<&PageFeatures>,
    others: &[&PageFeatures],
) -> Vec<ElementCoverage> {
    let pages: Vec<&PageFeatures> = baseline.into_iter().chain(others.iter().copied()).collect();
    if pages.is_empty() {
        return Vec::new();
    }
    let total = pages.len();

    ContentElement::ALL
        .iter()
        .map(|element| {
            let count = pages.iter().filter(|p| p.has_signal(*element)).count();
            let percentage = (1000.0 * count as f64 / total as f64).round() / 10.0;

            let priority = if count == 0 {
                Priority::GapOpportunity
            } else if baseline.is_some_and(|b| is_differentiator(*element, b, others)) {
                Priority::Differentiator
            } else if percentage > MUST_HAVE_PERCENTAGE {
                Priority::MustHave
            } else {
                Priority::Consider
            };

            ElementCoverage {
                element: *element,
                count,
                total,
                percentage,
                priority,
            }
        })
        .collect()
}

/// Present on the baseline and missing from at least one other page
pub fn is_differentiator(
    element: ContentElement,
    baseline: &PageFeatures,
    others: &[&PageFeatures],
) -> bool {
    baseline.has_signal(element) && others.iter().any(|p| !p.has_signal(element))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(signals: &[ContentElement]) -> PageFeatures {
        PageFeatures {
            signals: signals.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn find(coverage: &[ElementCoverage], element: ContentElement) -> &ElementCoverage {
        coverage.iter().find(|c| c.element == element).unwrap()
    }

    #[test]
    fn test_priorities() {
        use ContentElement::*;
        let baseline = page(&[FaqSection, VideoEmbed, Testimonials]);
        let second = page(&[FaqSection, Testimonials, CostPricing]);
        let third = page(&[Testimonials]);

        let coverage = coverage(Some(&baseline), &[&second, &third]);
        assert_eq!(coverage.len(), ContentElement::ALL.len());

        let faq = find(&coverage, FaqSection);
        assert_eq!((faq.count, faq.total), (2, 3));
        assert_eq!(faq.percentage, 66.7);
        assert_eq!(faq.priority, Priority::Differentiator);

        assert_eq!(find(&coverage, VideoEmbed).priority, Priority::Differentiator);
        assert_eq!(find(&coverage, Testimonials).priority, Priority::MustHave);

        let cost = find(&coverage, CostPricing);
        assert_eq!(cost.percentage, 33.3);
        assert_eq!(cost.priority, Priority::Consider);

        assert_eq!(find(&coverage, LiveChat).priority, Priority::GapOpportunity);
    }

    #[test]
    fn test_single_page_has_no_differentiators() {
        let only = page(&[ContentElement::FaqSection]);
        let coverage = coverage(Some(&only), &[]);

        let faq = find(&coverage, ContentElement::FaqSection);
        assert_eq!(faq.percentage, 100.0);
        assert_eq!(faq.priority, Priority::MustHave);
    }

    #[test]
    fn test_without_baseline_nothing_is_a_differentiator() {
        use ContentElement::*;
        let first = page(&[FaqSection, VideoEmbed]);
        let second = page(&[FaqSection]);

        let coverage = coverage(None, &[&first, &second]);
        assert_eq!(find(&coverage, FaqSection).priority, Priority::MustHave);
        let video = find(&coverage, VideoEmbed);
        assert_eq!((video.count, video.total), (1, 2));
        assert_eq!(video.priority, Priority::Consider);
    }

    #[test]
    fn test_no_pages_no_coverage() {
        assert!(coverage(None, &[]).is_empty());
    }
}
