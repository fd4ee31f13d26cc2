//! Content element detection
//!
//! Keyword and markup heuristics for the content blocks that tend to separate
//! strong procedure pages from thin ones. Matching runs on lowercased visible
//! text, with a few checks against the raw markup for embeds and widgets.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A content block that can be detected on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentElement {
    CtaButtons,
    FaqSection,
    Testimonials,
    SurgeonCredentials,
    TechnologyNames,
    OutcomeStatistics,
    OnlineScheduling,
    CostPricing,
    CandidacyQuiz,
    BeforeAfterPhotos,
    VideoEmbed,
    Financing,
    TrustBadges,
    GoogleReviewWidget,
    PressMentions,
    LiveChat,
    VideoTestimonials,
}

impl ContentElement {
    /// Every element, in display order
    pub const ALL: [ContentElement; 17] = [
        ContentElement::CtaButtons,
        ContentElement::FaqSection,
        ContentElement::Testimonials,
        ContentElement::SurgeonCredentials,
        ContentElement::TechnologyNames,
        ContentElement::OutcomeStatistics,
        ContentElement::OnlineScheduling,
        ContentElement::CostPricing,
        ContentElement::CandidacyQuiz,
        ContentElement::BeforeAfterPhotos,
        ContentElement::VideoEmbed,
        ContentElement::Financing,
        ContentElement::TrustBadges,
        ContentElement::GoogleReviewWidget,
        ContentElement::PressMentions,
        ContentElement::LiveChat,
        ContentElement::VideoTestimonials,
    ];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            ContentElement::CtaButtons => "CTA Buttons",
            ContentElement::FaqSection => "FAQ Section",
            ContentElement::Testimonials => "Testimonials/Reviews",
            ContentElement::SurgeonCredentials => "Surgeon Credentials",
            ContentElement::TechnologyNames => "Technology Names",
            ContentElement::OutcomeStatistics => "Outcome Statistics",
            ContentElement::OnlineScheduling => "Online Scheduling",
            ContentElement::CostPricing => "Cost/Pricing",
            ContentElement::CandidacyQuiz => "Candidacy Quiz",
            ContentElement::BeforeAfterPhotos => "Before/After Photos",
            ContentElement::VideoEmbed => "Video Embed",
            ContentElement::Financing => "Financing",
            ContentElement::TrustBadges => "Trust Badges",
            ContentElement::GoogleReviewWidget => "Google Review Widget",
            ContentElement::PressMentions => "Press Mentions",
            ContentElement::LiveChat => "Live Chat",
            ContentElement::VideoTestimonials => "Video Testimonials",
        }
    }

    /// Contribution to the richness score
    pub fn weight(&self) -> f64 {
        match self {
            ContentElement::FaqSection => 1.5,
            ContentElement::Testimonials
            | ContentElement::SurgeonCredentials
            | ContentElement::TechnologyNames
            | ContentElement::OutcomeStatistics
            | ContentElement::OnlineScheduling => 1.2,
            ContentElement::CostPricing
            | ContentElement::CandidacyQuiz
            | ContentElement::BeforeAfterPhotos => 0.8,
            ContentElement::VideoEmbed | ContentElement::VideoTestimonials => 0.6,
            ContentElement::CtaButtons
            | ContentElement::Financing
            | ContentElement::TrustBadges
            | ContentElement::GoogleReviewWidget => 0.5,
            ContentElement::PressMentions => 0.4,
            ContentElement::LiveChat => 0.3,
        }
    }

    /// Phrases searched for in the visible text
    fn text_phrases(&self) -> &'static [&'static str] {
        match self {
            ContentElement::FaqSection => &[
                "faq",
                "frequently asked",
                "common questions",
                "q&a",
                "questions and answers",
            ],
            ContentElement::Testimonials => &[
                "testimonial",
                "review",
                "patient story",
                "what our patients",
                "realself",
                "healthgrades",
            ],
            ContentElement::SurgeonCredentials => &[
                "board certified",
                "board-certified",
                "fellowship",
                "years of experience",
                "credentials",
            ],
            ContentElement::OnlineScheduling => &[
                "schedule online",
                "book online",
                "online scheduling",
                "schedule your",
            ],
            ContentElement::CostPricing => &[
                "cost",
                "price",
                "pricing",
                "$",
                "affordable",
                "investment",
            ],
            ContentElement::CandidacyQuiz => &[
                "candidate",
                "candidacy",
                "quiz",
                "self-test",
                "find out if",
            ],
            ContentElement::BeforeAfterPhotos => &[
                "before and after",
                "before & after",
                "before/after",
                "results gallery",
            ],
            ContentElement::Financing => &[
                "financing",
                "payment plan",
                "carecredit",
                "afford",
                "monthly",
            ],
            ContentElement::TrustBadges => &[
                "certified",
                "accredited",
                "award",
                "top doctor",
                "best of",
            ],
            ContentElement::PressMentions => &["as seen in", "featured in", "press", "media"],
            ContentElement::CtaButtons
            | ContentElement::TechnologyNames
            | ContentElement::OutcomeStatistics
            | ContentElement::VideoEmbed
            | ContentElement::GoogleReviewWidget
            | ContentElement::LiveChat
            | ContentElement::VideoTestimonials => &[],
        }
    }
}

static OUTCOME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d+%\s+of\s+patients",
        r"\d+%\s+.*?20/20",
        r"over\s+\d[\d,]*\s+procedures",
        r"\d+\+\s+years",
    ]
    .into_iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

const LIVE_CHAT_MARKERS: &[&str] = &["live chat", "chat widget", "intercom", "drift", "crisp"];

/// Inputs to content detection, gathered during the HTML walk
#[derive(Debug, Default)]
pub(crate) struct SignalInput<'a> {
    /// Visible body text, lowercased
    pub text: &'a str,

    /// Raw document markup, lowercased
    pub markup: &'a str,

    /// Document has a `<video>` element
    pub has_video_element: bool,

    /// Document has a `<details>` element
    pub has_details_element: bool,

    /// Some link or button carries a short call-to-action label
    pub has_button_text: bool,

    /// Some element has a class naming a video testimonial
    pub has_video_testimonial_class: bool,

    /// Product and technique names to look for
    pub technology_keywords: &'a [String],
}

/// Detect content elements
pub(crate) fn detect(input: &SignalInput<'_>) -> BTreeSet<ContentElement> {
    ContentElement::ALL
        .into_iter()
        .filter(|element| is_present(*element, input))
        .collect()
}

fn is_present(element: ContentElement, input: &SignalInput<'_>) -> bool {
    let text_match = element
        .text_phrases()
        .iter()
        .any(|phrase| input.text.contains(phrase));

    match element {
        ContentElement::FaqSection => text_match || input.has_details_element,
        ContentElement::OutcomeStatistics => OUTCOME_PATTERNS
            .iter()
            .any(|pattern| pattern.is_match(input.text)),
        ContentElement::VideoEmbed => {
            input.has_video_element
                || input.markup.contains("youtube")
                || input.markup.contains("vimeo")
        }
        ContentElement::GoogleReviewWidget => {
            input.markup.contains("google")
                && (input.markup.contains("review") || input.markup.contains("rating"))
        }
        ContentElement::LiveChat => LIVE_CHAT_MARKERS
            .iter()
            .any(|marker| input.markup.contains(marker)),
        ContentElement::CtaButtons => input.has_button_text,
        ContentElement::TechnologyNames => {
            !find_technologies(input.text, input.technology_keywords).is_empty()
        }
        ContentElement::VideoTestimonials => {
            input.text.contains("video testimonial")
                || (input.has_video_testimonial_class
                    && ContentElement::Testimonials
                        .text_phrases()
                        .iter()
                        .any(|phrase| input.text.contains(phrase)))
        }
        _ => text_match,
    }
}

/// Technology keywords mentioned in the lowercased text, in keyword order
pub(crate) fn find_technologies(text: &str, keywords: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() || found.iter().any(|f| f.eq_ignore_ascii_case(keyword)) {
            continue;
        }
        if text.contains(&keyword.to_lowercase()) {
            found.push(keyword.to_string());
        }
    }
    found
}

/// Weighted richness score, 0 to 10 with one decimal
pub fn richness_score(signals: &BTreeSet<ContentElement>) -> f64 {
    let total: f64 = ContentElement::ALL.iter().map(ContentElement::weight).sum();
    let present: f64 = signals.iter().map(ContentElement::weight).sum();
    let score = present / (total / 10.0);
    ((score * 10.0).round() / 10.0).min(10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect_text(text: &str) -> BTreeSet<ContentElement> {
        detect(&SignalInput {
            text,
            ..Default::default()
        })
    }

    #[test]
    fn test_text_phrases_are_detected() {
        let signals = detect_text(
            "frequently asked questions about lasik. read a patient story. \
             schedule your consultation today.",
        );

        assert!(signals.contains(&ContentElement::FaqSection));
        assert!(signals.contains(&ContentElement::Testimonials));
        assert!(signals.contains(&ContentElement::OnlineScheduling));
        assert!(!signals.contains(&ContentElement::Financing));
    }

    #[test]
    fn test_outcome_statistics_patterns() {
        assert!(detect_text("98% of patients achieved 20/20 vision")
            .contains(&ContentElement::OutcomeStatistics));
        assert!(detect_text("over 10,000 procedures performed")
            .contains(&ContentElement::OutcomeStatistics));
        assert!(detect_text("25+ years serving dallas").contains(&ContentElement::OutcomeStatistics));
        assert!(!detect_text("many happy people").contains(&ContentElement::OutcomeStatistics));
    }

    #[test]
    fn test_markup_signals() {
        let signals = detect(&SignalInput {
            text: "",
            markup: r#"<iframe src="https://www.youtube.com/embed/x"></iframe><script src="https://widget.intercom.io"></script>"#,
            has_details_element: true,
            ..Default::default()
        });

        assert!(signals.contains(&ContentElement::VideoEmbed));
        assert!(signals.contains(&ContentElement::LiveChat));
        assert!(signals.contains(&ContentElement::FaqSection));
        assert!(!signals.contains(&ContentElement::GoogleReviewWidget));
    }

    #[test]
    fn test_empty_input_detects_nothing() {
        assert!(detect(&SignalInput::default()).is_empty());
    }

    #[test]
    fn test_richness_score_bounds() {
        assert_eq!(richness_score(&BTreeSet::new()), 0.0);

        let all: BTreeSet<_> = ContentElement::ALL.into_iter().collect();
        assert_eq!(richness_score(&all), 10.0);
    }

    #[test]
    fn test_richness_score_is_weighted() {
        let total: f64 = ContentElement::ALL.iter().map(ContentElement::weight).sum();
        assert!((total - 13.8).abs() < 1e-9);

        // 1.5 / 1.38
        let faq: BTreeSet<_> = [ContentElement::FaqSection].into_iter().collect();
        assert_eq!(richness_score(&faq), 1.1);

        let chat: BTreeSet<_> = [ContentElement::LiveChat].into_iter().collect();
        assert_eq!(richness_score(&chat), 0.2);

        let tech: BTreeSet<_> = [ContentElement::TechnologyNames, ContentElement::CtaButtons]
            .into_iter()
            .collect();
        assert_eq!(richness_score(&tech), 1.2);
    }

    #[test]
    fn test_technology_names() {
        let keywords = vec!["MAKO".to_string(), "da Vinci".to_string(), "mako".to_string()];
        let text = "our mako robotic arm and the da vinci system";

        assert_eq!(find_technologies(text, &keywords), vec!["MAKO", "da Vinci"]);
        assert!(detect(&SignalInput {
            text,
            technology_keywords: &keywords,
            ..Default::default()
        })
        .contains(&ContentElement::TechnologyNames));
        assert!(!detect_text(text).contains(&ContentElement::TechnologyNames));
    }

    #[test]
    fn test_cta_and_video_testimonials() {
        let signals = detect(&SignalInput {
            text: "read patient testimonials",
            has_button_text: true,
            has_video_testimonial_class: true,
            ..Default::default()
        });
        assert!(signals.contains(&ContentElement::CtaButtons));
        assert!(signals.contains(&ContentElement::VideoTestimonials));

        // The class alone is not enough without testimonial wording
        let signals = detect(&SignalInput {
            text: "welcome",
            has_video_testimonial_class: true,
            ..Default::default()
        });
        assert!(!signals.contains(&ContentElement::VideoTestimonials));
        assert!(detect_text("watch a video testimonial").contains(&ContentElement::VideoTestimonials));
    }
}
