//! Feature extraction over the `scraper` HTML parser

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::signals::{self, SignalInput};
use super::{
    FeatureExtractor, HeadingCounts, HeroSummary, InternalLink, JS_RENDERING_WORD_THRESHOLD,
    PageFeatures,
};
use crate::config::{AnalyzerConfig, default_exclude_selectors, default_technology_keywords};

/// Elements whose text never renders
const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "svg", "object",
];

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Only this many leading `p`/`h2`/`div` blocks are considered for the hero
const HERO_BLOCK_LIMIT: usize = 20;
const SUBHEADLINE_CHARS: usize = 200;
/// Visible text checked for trust markers, in characters
const HERO_TEXT_CHARS: usize = 4000;

const CTA_CLASS_MARKERS: &[&str] = &["btn", "button", "cta", "schedule", "consult"];
const CTA_PHRASES: &[&str] = &["schedule", "consult", "book", "get started", "learn more"];
const HERO_CLASS_MARKERS: &[&str] = &["hero", "banner", "header"];

static VIDEO_TESTIMONIAL_CLASS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"video.*testimonial|testimonial.*video").ok());

static TRUST_MARKERS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"certified|accredited|award|years|board|fellowship|\bm\.?d\b|\bd\.o\.").ok()
});

/// Extracts page features from HTML
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    /// Boilerplate regions left out of the visible text
    exclude: Vec<Selector>,
    technology_keywords: Vec<String>,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(&default_exclude_selectors())
    }
}

impl HtmlExtractor {
    /// Create an extractor that skips the given boilerplate selectors.
    /// Selectors that fail to parse are logged and ignored.
    pub fn new(exclude_selectors: &[String]) -> Self {
        let exclude = exclude_selectors
            .iter()
            .filter_map(|selector_str| match Selector::parse(selector_str) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    warn!("Failed to parse selector '{}': {}", selector_str, e);
                    None
                }
            })
            .collect();

        Self {
            exclude,
            technology_keywords: default_technology_keywords(),
        }
    }

    /// Look for these technology names instead of the defaults
    pub fn with_technology_keywords(mut self, keywords: Vec<String>) -> Self {
        self.technology_keywords = keywords;
        self
    }

    /// Create an extractor from the run configuration
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(&config.exclude_selectors)
            .with_technology_keywords(config.technology_keywords.clone())
    }

    fn is_excluded(&self, element: &ElementRef<'_>) -> bool {
        self.exclude.iter().any(|selector| selector.matches(element))
    }
}

/// Everything collected in one pass over the document
#[derive(Default)]
struct Walk<'a> {
    headings: HeadingCounts,
    visible: Vec<&'a str>,
    title: Option<String>,
    has_title: bool,
    meta_description: Option<String>,
    has_meta_description: bool,
    has_schema_markup: bool,
    schema_types: Vec<String>,
    h1: Option<String>,
    h2s: Vec<String>,
    has_video_element: bool,
    has_embedded_video: bool,
    has_details_element: bool,
    has_button_text: bool,
    has_video_testimonial_class: bool,
    has_background_image: bool,
    cta_by_class: Option<String>,
    cta_by_text: Option<String>,
    hero_blocks: usize,
    hero_settled: bool,
    subheadline: Option<String>,
    /// `(href, anchor text)` of every link
    links: Vec<(&'a str, String)>,
}

impl FeatureExtractor for HtmlExtractor {
    fn extract(&self, html: &str) -> PageFeatures {
        self.extract_from(html, None)
    }

    fn extract_page(&self, html: &str, url: &str) -> PageFeatures {
        let base = Url::parse(url).ok();
        self.extract_from(html, base.as_ref())
    }
}

impl HtmlExtractor {
    fn extract_from(&self, html: &str, base: Option<&Url>) -> PageFeatures {
        let document = Html::parse_document(html);
        if !document.errors.is_empty() {
            debug!("Parsed HTML with {} recoverable errors", document.errors.len());
        }

        let walk = self.walk(&document);

        let word_count = walk
            .visible
            .iter()
            .map(|fragment| fragment.split_whitespace().count())
            .sum();

        let text = walk.visible.join(" ").to_lowercase();
        let markup = html.to_lowercase();
        let signals = signals::detect(&SignalInput {
            text: &text,
            markup: &markup,
            has_video_element: walk.has_video_element,
            has_details_element: walk.has_details_element,
            has_button_text: walk.has_button_text,
            has_video_testimonial_class: walk.has_video_testimonial_class,
            technology_keywords: &self.technology_keywords,
        });
        let richness_score = signals::richness_score(&signals);
        let technologies = signals::find_technologies(&text, &self.technology_keywords);

        let internal_links = base
            .map(|base| internal_links(base, &walk.links))
            .unwrap_or_default();

        let hero = HeroSummary {
            headline: walk.h1.clone(),
            subheadline: walk.subheadline,
            cta_text: walk.cta_by_class.or(walk.cta_by_text),
            has_video: walk.has_video_element || walk.has_embedded_video,
            has_background_image: walk.has_background_image,
            has_trust_badge: has_trust_badge(&text),
        };

        PageFeatures {
            heading_counts: walk.headings,
            word_count,
            has_schema_markup: walk.has_schema_markup,
            schema_types: walk.schema_types,
            has_title: walk.has_title,
            title: walk.title,
            has_meta_description: walk.has_meta_description,
            meta_description: walk.meta_description,
            h1: walk.h1,
            h2s: walk.h2s,
            signals,
            richness_score,
            js_rendering_suspected: word_count < JS_RENDERING_WORD_THRESHOLD,
            technologies,
            hero,
            internal_links,
        }
    }

    /// Depth-first walk in document order. An explicit stack keeps deeply
    /// nested markup from exhausting the call stack.
    fn walk<'a>(&self, document: &'a Html) -> Walk<'a> {
        let mut walk = Walk::default();
        // (node, inside <body>, inside a never-rendered element, inside a
        // hidden or excluded element)
        let mut stack = vec![(document.tree.root(), false, false, false)];

        while let Some((node, in_body, inert, hidden)) = stack.pop() {
            let (in_body, inert, hidden) = match node.value() {
                Node::Text(text) => {
                    if in_body && !hidden {
                        walk.visible.push(text);
                    }
                    continue;
                }
                Node::Element(element) => {
                    let Some(element_ref) = ElementRef::wrap(node) else {
                        continue;
                    };
                    let name = element.name();
                    walk.record_element(element_ref, in_body, inert);

                    let inert = inert || HIDDEN_ELEMENTS.contains(&name);
                    let hidden = hidden || inert || (in_body && self.is_excluded(&element_ref));
                    (in_body || name == "body", inert, hidden)
                }
                Node::Document | Node::Fragment => (in_body, inert, hidden),
                _ => continue,
            };

            let children: Vec<_> = node.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, in_body, inert, hidden));
            }
        }

        walk
    }
}

impl<'a> Walk<'a> {
    /// `in_body` and `inert` describe the element's ancestors
    fn record_element(&mut self, element: ElementRef<'a>, in_body: bool, inert: bool) {
        let value = element.value();
        let name = value.name();

        if !inert {
            if let Some(level) = heading_level(name) {
                self.headings.increment(level);
                match level {
                    1 if self.h1.is_none() => self.h1 = Some(normalized_text(&element)),
                    2 => self.h2s.push(normalized_text(&element)),
                    _ => {}
                }
            }
        }

        match name {
            // <title> inside inline SVG or MathML labels an icon, not the page
            "title" if &*value.name.ns == HTML_NAMESPACE => {
                self.has_title = true;
                if self.title.is_none() {
                    self.title = Some(normalized_text(&element)).filter(|t| !t.is_empty());
                }
            }
            "meta" => {
                let is_description = value
                    .attr("name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case("description"));
                if is_description {
                    self.has_meta_description = true;
                    if self.meta_description.is_none() {
                        self.meta_description = value
                            .attr("content")
                            .map(|c| c.split_whitespace().collect::<Vec<_>>().join(" "))
                            .filter(|c| !c.is_empty());
                    }
                }
            }
            "script" => {
                let is_json_ld = value
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"));
                if is_json_ld {
                    self.has_schema_markup = true;
                    let body: String = element.text().collect();
                    collect_schema_types(&body, &mut self.schema_types);
                }
            }
            "video" => self.has_video_element = true,
            "iframe" => {
                if value.attr("src").is_some_and(is_video_host) {
                    self.has_embedded_video = true;
                }
            }
            "details" => self.has_details_element = true,
            "a" | "button" => self.record_action(element),
            _ => {}
        }

        if in_body && !inert && matches!(name, "p" | "h2" | "div") {
            self.record_hero_block(name, &element);
        }

        let microdata = ["itemtype", "vocab"]
            .iter()
            .filter_map(|attr| value.attr(attr))
            .any(|v| v.to_ascii_lowercase().contains("schema.org"));
        if microdata {
            self.has_schema_markup = true;
        }

        self.record_styling(&element);
    }

    /// Links and buttons: call-to-action labels and link targets
    fn record_action(&mut self, element: ElementRef<'a>) {
        let value = element.value();
        let text = normalized_text(&element);
        let len = text.chars().count();
        if len > 3 && len < 80 {
            self.has_button_text = true;
        }

        let href = if value.name() == "a" {
            value.attr("href").map(str::trim)
        } else {
            None
        };

        if !text.is_empty() {
            let cta_class = value.attr("class").is_some_and(|class| {
                let class = class.to_lowercase();
                CTA_CLASS_MARKERS.iter().any(|marker| class.contains(marker))
            });
            if cta_class && self.cta_by_class.is_none() {
                self.cta_by_class = Some(text.clone());
            }

            if href.is_some() && len < 50 && self.cta_by_text.is_none() {
                let lower = text.to_lowercase();
                if CTA_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
                    self.cta_by_text = Some(text.clone());
                }
            }
        }

        if let Some(href) = href {
            self.links.push((href, text));
        }
    }

    /// The first substantial block near the top becomes the subheadline
    fn record_hero_block(&mut self, name: &str, element: &ElementRef<'_>) {
        if self.hero_settled || self.hero_blocks >= HERO_BLOCK_LIMIT {
            return;
        }
        self.hero_blocks += 1;

        let text = normalized_text(element);
        if text.chars().count() > 20 {
            self.hero_settled = true;
            if name != "h2" {
                self.subheadline = Some(text.chars().take(SUBHEADLINE_CHARS).collect());
            }
        }
    }

    fn record_styling(&mut self, element: &ElementRef<'_>) {
        let value = element.value();

        if let Some(class) = value.attr("class") {
            let class = class.to_lowercase();
            if !self.has_video_testimonial_class
                && VIDEO_TESTIMONIAL_CLASS
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(&class))
            {
                self.has_video_testimonial_class = true;
            }

            let hero_class = HERO_CLASS_MARKERS.iter().any(|marker| class.contains(marker));
            let styled = value.attr("style").is_some_and(|s| !s.trim().is_empty());
            if !self.has_background_image && hero_class && (styled || contains_media(element)) {
                self.has_background_image = true;
            }
        }

        if !self.has_background_image {
            let background = value.attr("style").is_some_and(|style| {
                let style = style.to_lowercase();
                style.contains("background-image") || style.contains("background:")
            });
            if background {
                self.has_background_image = true;
            }
        }
    }
}

fn is_video_host(src: &str) -> bool {
    let src = src.to_ascii_lowercase();
    src.contains("youtube") || src.contains("vimeo")
}

fn contains_media(element: &ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|child| matches!(child.value().name(), "img" | "video"))
}

/// Credentials or awards in the first few thousand characters of visible text
fn has_trust_badge(text: &str) -> bool {
    let top = match text.char_indices().nth(HERO_TEXT_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    };
    TRUST_MARKERS
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(top))
}

/// Same-site links resolved against the page URL. A leading `www.` is
/// ignored when comparing hosts.
fn internal_links(base: &Url, links: &[(&str, String)]) -> Vec<InternalLink> {
    let Some(site) = site_host(base) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut internal = Vec::new();
    for (href, anchor) in links {
        let lower = href.to_ascii_lowercase();
        if href.is_empty() || href.starts_with('#') || lower.starts_with("javascript:") {
            continue;
        }
        let Ok(target) = base.join(href) else {
            continue;
        };
        if site_host(&target) != Some(site) {
            continue;
        }

        let url = target.to_string();
        if seen.insert((url.clone(), anchor.clone())) {
            internal.push(InternalLink {
                url,
                anchor_text: anchor.clone(),
            });
        }
    }
    internal
}

fn site_host(url: &Url) -> Option<&str> {
    url.host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host))
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn normalized_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull `@type` values out of a JSON-LD block. Broken JSON is ignored; the
/// block still counts as markup.
fn collect_schema_types(body: &str, types: &mut Vec<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body.trim()) else {
        debug!("Ignoring unparseable JSON-LD block");
        return;
    };

    let mut pending = vec![&value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items.iter().rev()),
            Value::Object(map) => {
                match map.get("@type") {
                    Some(Value::String(t)) => push_unique(types, t),
                    Some(Value::Array(ts)) => {
                        for t in ts.iter().filter_map(Value::as_str) {
                            push_unique(types, t);
                        }
                    }
                    _ => {}
                }
                if let Some(graph) = map.get("@graph") {
                    pending.push(graph);
                }
            }
            _ => {}
        }
    }
}

fn push_unique(types: &mut Vec<String>, t: &str) {
    if !types.iter().any(|existing| existing == t) {
        types.push(t.to_string());
    }
}
