//! Page type classification
//!
//! A first guess comes from the URL alone, before anything is downloaded.
//! Once the page is extracted, [`ContentClassifier`] checks the headlines and
//! overrides the guess when they disagree with it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::PageFeatures;
use crate::config::AnalyzerConfig;

const BLOG_FOLDERS: &[&str] = &["/blog/", "/news/", "/articles/"];
const LOCATION_FOLDERS: &[&str] = &["/locations/", "/offices/", "/clinics/"];
const INDEX_PATHS: &[&str] = &["/index", "/index.html", "/index.htm", "/index.php"];

/// Short pages whose H1 opens with one of these read like a location page
const LOCATION_H1_MARKERS: &[&str] = &["location", "office", "our"];
const SHORT_PAGE_WORDS: usize = 400;
/// A procedure page under a location usually has a long outline
const PROCEDURE_LOCATION_MIN_H2S: usize = 5;

static DATE_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"/\d{4}/|\d{4}-\d{2}|/\d{2}-\d{2}-\d{4}/|/[a-z]{3}-\d{4}/").ok()
});

/// Kind of page that is ranking for the keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    /// Site root; usually ranks on domain authority
    Homepage,
    /// Dedicated page for the procedure
    ServicePage,
    /// Procedure page scoped to a location
    ProcedureLocation,
    /// Location or office page covering many services
    GeoPage,
    /// Blog post or news article
    BlogArticle,
}

impl PageType {
    /// Classify a page from its URL and the searched keyword
    pub fn classify(url: &str, keyword: &str) -> PageType {
        let Ok(parsed) = Url::parse(url) else {
            return PageType::ServicePage;
        };

        let path = parsed.path().to_lowercase();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() || INDEX_PATHS.contains(&trimmed) {
            return PageType::Homepage;
        }

        let is_dated = DATE_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&path));
        if is_dated || BLOG_FOLDERS.iter().any(|folder| path.contains(folder)) {
            return PageType::BlogArticle;
        }

        if LOCATION_FOLDERS.iter().any(|folder| path.contains(folder)) {
            return PageType::GeoPage;
        }

        let segments = trimmed.split('/').filter(|s| !s.is_empty()).count();
        if keyword_slugs(keyword).iter().any(|slug| path.contains(slug)) && segments >= 2 {
            return PageType::ProcedureLocation;
        }

        PageType::ServicePage
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            PageType::Homepage => "Homepage",
            PageType::ServicePage => "Service Page",
            PageType::ProcedureLocation => "Procedure+Location",
            PageType::GeoPage => "Geo Page",
            PageType::BlogArticle => "Blog/Article",
        }
    }

    /// Pages that compete on content for the keyword: service pages and
    /// procedure pages scoped to a location
    pub fn is_qualifying(&self) -> bool {
        matches!(self, PageType::ServicePage | PageType::ProcedureLocation)
    }
}

/// Corrects a URL-based page type from the page's own headlines
#[derive(Debug, Clone, Default)]
pub struct ContentClassifier {
    geo_signals: Vec<String>,
    procedure_signals: Vec<String>,
}

impl ContentClassifier {
    /// Create a classifier from phrase lists; matching is case-insensitive
    pub fn new(geo_signals: &[String], procedure_signals: &[String]) -> Self {
        let lower = |signals: &[String]| -> Vec<String> {
            signals
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            geo_signals: lower(geo_signals),
            procedure_signals: lower(procedure_signals),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(&config.geo_page_signals, &config.procedure_signals)
    }

    /// Final page type for an extracted page. The H1 and H2 headlines win
    /// over the URL guess when they point somewhere else.
    pub fn refine(&self, guess: PageType, features: &PageFeatures, keyword: &str) -> PageType {
        let h1 = features.h1.as_deref().unwrap_or_default().to_lowercase();
        let mut headlines = h1.clone();
        for h2 in &features.h2s {
            headlines.push(' ');
            headlines.push_str(&h2.to_lowercase());
        }
        let keyword = keyword.trim().to_lowercase();

        let has_geo_signal = self.geo_signals.iter().any(|s| headlines.contains(s.as_str()));
        let procedure_signals = self
            .procedure_signals
            .iter()
            .filter(|s| headlines.contains(s.as_str()))
            .count();
        let mut page_type = guess;

        // A short page with a location-style H1 and location wording
        if !h1.is_empty()
            && features.word_count < SHORT_PAGE_WORDS
            && LOCATION_H1_MARKERS.iter().any(|m| h1.contains(m))
            && has_geo_signal
        {
            page_type = PageType::GeoPage;
        }

        // Location wording without clinical depth for the keyword
        let mentions_keyword = !keyword.is_empty() && headlines.contains(&keyword);
        if has_geo_signal && procedure_signals < 2 && !mentions_keyword {
            page_type = PageType::GeoPage;
        }

        // Clinical content on what the URL made look like a location page
        if procedure_signals > 0 && guess == PageType::GeoPage {
            page_type = if h1.contains("location") || features.h2s.len() >= PROCEDURE_LOCATION_MIN_H2S {
                PageType::ProcedureLocation
            } else {
                PageType::ServicePage
            };
        }

        // The H1 names the procedure and the outline is clinical
        if !keyword.is_empty() && h1.contains(&keyword) && procedure_signals > 0 {
            match guess {
                PageType::GeoPage => page_type = PageType::ProcedureLocation,
                PageType::Homepage => page_type = PageType::ServicePage,
                _ => {}
            }
        }

        page_type
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ways a keyword shows up in a URL path
fn keyword_slugs(keyword: &str) -> Vec<String> {
    let words: Vec<String> = keyword
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return Vec::new();
    }
    vec![words.join("-"), words.join("_"), words.concat()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homepage() {
        assert_eq!(PageType::classify("https://clinic.example", "lasik"), PageType::Homepage);
        assert_eq!(PageType::classify("https://clinic.example/", "lasik"), PageType::Homepage);
        assert_eq!(
            PageType::classify("https://clinic.example/index.html", "lasik"),
            PageType::Homepage
        );
    }

    #[test]
    fn test_blog_article() {
        assert_eq!(
            PageType::classify("https://clinic.example/blog/lasik-recovery", "lasik"),
            PageType::BlogArticle
        );
        assert_eq!(
            PageType::classify("https://clinic.example/2024/05/lasik-myths", "lasik"),
            PageType::BlogArticle
        );
    }

    #[test]
    fn test_geo_page() {
        assert_eq!(
            PageType::classify("https://clinic.example/locations/dallas/", "lasik"),
            PageType::GeoPage
        );
    }

    #[test]
    fn test_procedure_pages() {
        assert_eq!(
            PageType::classify("https://ortho.example/dallas/knee-replacement/", "Knee Replacement"),
            PageType::ProcedureLocation
        );
        assert_eq!(
            PageType::classify("https://ortho.example/knee-replacement", "knee replacement"),
            PageType::ServicePage
        );
        assert_eq!(
            PageType::classify("https://ortho.example/services/hips", "knee replacement"),
            PageType::ServicePage
        );
    }

    #[test]
    fn test_unparseable_url_defaults_to_service_page() {
        assert_eq!(PageType::classify("not a url", "lasik"), PageType::ServicePage);
    }

    fn page(h1: &str, h2s: &[&str], word_count: usize) -> PageFeatures {
        PageFeatures {
            h1: Some(h1.to_string()),
            h2s: h2s.iter().map(|h| h.to_string()).collect(),
            word_count,
            ..Default::default()
        }
    }

    fn classifier() -> ContentClassifier {
        ContentClassifier::from_config(&AnalyzerConfig::default())
    }

    #[test]
    fn test_qualifying_page_types() {
        assert!(PageType::ServicePage.is_qualifying());
        assert!(PageType::ProcedureLocation.is_qualifying());
        assert!(!PageType::Homepage.is_qualifying());
        assert!(!PageType::GeoPage.is_qualifying());
        assert!(!PageType::BlogArticle.is_qualifying());
    }

    #[test]
    fn test_homepage_with_procedure_headline_becomes_service_page() {
        let features = page(
            "Knee Replacement Surgery",
            &["Am I a Candidate?", "Recovery", "Risks"],
            1500,
        );
        assert_eq!(
            classifier().refine(PageType::Homepage, &features, "knee replacement"),
            PageType::ServicePage
        );
    }

    #[test]
    fn test_geo_url_with_clinical_outline() {
        let short = page("Knee Surgery", &["Recovery"], 900);
        assert_eq!(
            classifier().refine(PageType::GeoPage, &short, "knee replacement"),
            PageType::ServicePage
        );

        let long = page(
            "Knee Replacement at Our Dallas Location",
            &["Overview", "Candidate", "Procedure", "Recovery", "Risks"],
            2500,
        );
        assert_eq!(
            classifier().refine(PageType::GeoPage, &long, "knee replacement"),
            PageType::ProcedureLocation
        );
    }

    #[test]
    fn test_location_headlines_make_a_geo_page() {
        let features = page("Our Plano Office", &["Services We Offer", "Get Directions"], 250);
        assert_eq!(
            classifier().refine(PageType::ServicePage, &features, "knee replacement"),
            PageType::GeoPage
        );
    }

    #[test]
    fn test_plain_service_page_is_kept() {
        let features = page("Knee Replacement", &["Recovery"], 1200);
        assert_eq!(
            classifier().refine(PageType::ServicePage, &features, "knee replacement"),
            PageType::ServicePage
        );
        assert_eq!(
            classifier().refine(PageType::BlogArticle, &PageFeatures::default(), "knee replacement"),
            PageType::BlogArticle
        );
    }

    #[test]
    fn test_keyword_slugs() {
        assert_eq!(
            keyword_slugs("Knee  Replacement"),
            vec!["knee-replacement", "knee_replacement", "kneereplacement"]
        );
        assert!(keyword_slugs("   ").is_empty());
    }
}
