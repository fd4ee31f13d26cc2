//! # Structure Extraction Module
//!
//! Turns the raw HTML of a ranking page into a flat [`PageFeatures`] record:
//! heading counts per level, visible word count, structured-data markup,
//! title and meta description presence, plus the content elements a clinic
//! page tends to carry (FAQ, testimonials, pricing and so on).
//!
//! ## Key Components
//!
//! - `FeatureExtractor`: the extraction seam, one method from HTML to features
//! - `HtmlExtractor`: implementation over the `scraper` HTML parser
//! - `ContentElement`: detectable content blocks and their richness weights
//! - `PageType`: URL-based classification of a ranking page
//! - `ContentClassifier`: corrects the URL guess from the extracted headlines
//!
//! Extraction never fails. Broken or partial HTML yields zero counts and
//! `false` flags for whatever cannot be found.

mod html;
mod page_type;
mod signals;

pub use html::HtmlExtractor;
pub use page_type::{ContentClassifier, PageType};
pub use signals::{ContentElement, richness_score};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Pages with fewer visible words than this probably render client-side
pub const JS_RENDERING_WORD_THRESHOLD: usize = 200;

/// Number of heading elements per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingCounts {
    /// Count for a heading level (1-6). Other levels count zero.
    pub fn get(&self, level: u8) -> usize {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            4 => self.h4,
            5 => self.h5,
            6 => self.h6,
            _ => 0,
        }
    }

    /// Record one heading of the given level
    pub fn increment(&mut self, level: u8) {
        let slot = match level {
            1 => &mut self.h1,
            2 => &mut self.h2,
            3 => &mut self.h3,
            4 => &mut self.h4,
            5 => &mut self.h5,
            6 => &mut self.h6,
            _ => return,
        };
        *slot += 1;
    }

    /// Total number of headings across all levels
    pub fn total(&self) -> usize {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }

    /// `(level, count)` pairs for levels 1 through 6
    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        (1..=6).map(move |level| (level, self.get(level)))
    }
}

/// Structural fingerprint of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageFeatures {
    /// Heading elements per level
    pub heading_counts: HeadingCounts,

    /// Whitespace-separated words of visible body text
    pub word_count: usize,

    /// Whether the page carries schema.org structured data
    pub has_schema_markup: bool,

    /// `@type` values found in JSON-LD blocks
    pub schema_types: Vec<String>,

    /// Whether the document has a `<title>` element
    pub has_title: bool,

    /// Text of the first `<title>`
    pub title: Option<String>,

    /// Whether the document has a `<meta name="description">` tag
    pub has_meta_description: bool,

    /// Content of the meta description
    pub meta_description: Option<String>,

    /// Text of the first `<h1>`
    pub h1: Option<String>,

    /// Text of every `<h2>` in document order
    pub h2s: Vec<String>,

    /// Content elements detected on the page
    pub signals: BTreeSet<ContentElement>,

    /// Weighted content richness, 0 to 10
    pub richness_score: f64,

    /// Very little visible text; the page may need JavaScript to render
    pub js_rendering_suspected: bool,

    /// Technology names mentioned on the page
    pub technologies: Vec<String>,

    /// The first screen of the page
    pub hero: HeroSummary,

    /// Links to the same site, deduplicated by target and anchor text.
    /// Empty when the page URL is unknown.
    pub internal_links: Vec<InternalLink>,
}

/// What a visitor sees before scrolling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSummary {
    /// Text of the first `<h1>`
    pub headline: Option<String>,

    /// First substantial paragraph or block, at most 200 characters
    pub subheadline: Option<String>,

    /// Label of the first call-to-action link or button
    pub cta_text: Option<String>,

    pub has_video: bool,
    pub has_background_image: bool,

    /// Credentials or awards near the top of the page
    pub has_trust_badge: bool,
}

/// A link to another page on the same site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLink {
    /// Absolute target URL
    pub url: String,
    pub anchor_text: String,
}

impl PageFeatures {
    /// Whether a content element was detected
    pub fn has_signal(&self, element: ContentElement) -> bool {
        self.signals.contains(&element)
    }
}

/// Extracts structural features from raw HTML
pub trait FeatureExtractor {
    /// Parse the HTML and extract its features. Never fails.
    fn extract(&self, html: &str) -> PageFeatures;

    /// Extract a page whose URL is known, so relative links can be resolved
    fn extract_page(&self, html: &str, _url: &str) -> PageFeatures {
        self.extract(html)
    }
}
