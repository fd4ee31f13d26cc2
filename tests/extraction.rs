use std::path::Path;

use pagecompare::extract::{ContentElement, FeatureExtractor, HeadingCounts, HtmlExtractor};

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_service_page_counts() {
    let features = HtmlExtractor::default().extract(&fixture("service_page.html"));

    assert_eq!(
        features.heading_counts,
        HeadingCounts {
            h1: 1,
            h2: 3,
            h3: 2,
            ..Default::default()
        }
    );
    assert_eq!(features.heading_counts.total(), 6);
    // Header, nav, cookie banner, footer and scripts are left out
    assert_eq!(features.word_count, 50);
    assert!(features.js_rendering_suspected);
}

#[test]
fn test_service_page_metadata() {
    let features = HtmlExtractor::default().extract(&fixture("service_page.html"));

    assert!(features.has_title);
    assert_eq!(
        features.title.as_deref(),
        Some("Knee Replacement Surgery | Dallas Ortho")
    );
    assert!(features.has_meta_description);
    assert!(features.has_schema_markup);
    assert_eq!(features.schema_types, vec!["MedicalProcedure"]);
    assert_eq!(features.h1.as_deref(), Some("Knee Replacement Surgery"));
    assert_eq!(
        features.h2s,
        vec![
            "Who Is a Candidate?",
            "Frequently Asked Questions",
            "Cost and Financing"
        ]
    );
}

#[test]
fn test_service_page_signals() {
    let features = HtmlExtractor::default().extract(&fixture("service_page.html"));

    for element in [
        ContentElement::FaqSection,
        ContentElement::SurgeonCredentials,
        ContentElement::OutcomeStatistics,
        ContentElement::CandidacyQuiz,
        ContentElement::Financing,
    ] {
        assert!(features.has_signal(element), "expected {}", element.label());
    }
    assert!(!features.has_signal(ContentElement::VideoEmbed));
    assert!(!features.has_signal(ContentElement::LiveChat));
    assert!(features.richness_score > 0.0 && features.richness_score <= 10.0);
}

#[test]
fn test_broken_page_degrades_gracefully() {
    let features = HtmlExtractor::default().extract(&fixture("broken_page.html"));

    assert_eq!(features.heading_counts.h1, 1);
    assert_eq!(features.heading_counts.h2, 2);
    assert_eq!(features.heading_counts.total(), 3);
    assert_eq!(features.word_count, 14);
    assert_eq!(features.h1.as_deref(), Some("Broken page"));
    assert!(features.has_title);
    assert!(!features.has_meta_description);
    // A JSON-LD block that does not parse still counts as markup
    assert!(features.has_schema_markup);
    assert!(features.schema_types.is_empty());
}

#[test]
fn test_extraction_is_deterministic() {
    let html = fixture("service_page.html");
    let extractor = HtmlExtractor::default();

    assert_eq!(extractor.extract(&html), extractor.extract(&html));
}

#[test]
fn test_non_html_input() {
    let features = HtmlExtractor::default().extract("{\"not\": \"html\"}");

    assert_eq!(features.heading_counts.total(), 0);
    assert_eq!(features.word_count, 2);
    assert!(!features.has_title);
    assert!(!features.has_schema_markup);
}

#[test]
fn test_icon_titles_are_not_the_page_title() {
    let features = HtmlExtractor::default().extract(&fixture("icon_titles.html"));

    assert!(!features.has_title);
    assert_eq!(features.title, None);
    assert_eq!(features.heading_counts.h1, 1);
    // The template heading is never rendered
    assert_eq!(features.heading_counts.h2, 0);
    assert!(features.h2s.is_empty());
}
