//! # Analyzer Configuration Module
//!
//! Configuration for a single analysis run: how many results to pull, how
//! long to wait on each page, how many pages to load at once and which page
//! regions count as boilerplate. It uses the same builder pattern as the rest
//! of the crate.
//!
//! The search API key is kept apart from [`AnalyzerConfig`] as an [`ApiKey`]
//! value that is handed to the search client explicitly, so nothing in the
//! library reads the environment on its own.

use std::fmt;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Environment variable holding the SerpAPI key
pub const API_KEY_ENV: &str = "SERPAPI_KEY";

/// Environment variable overriding the SerpAPI base URL
pub const BASE_URL_ENV: &str = "SERPAPI_BASE_URL";

/// Default SerpAPI endpoint
pub const DEFAULT_SERP_BASE_URL: &str = "https://serpapi.com";

/// Value shipped in the example `.env`; treated as unset
const PLACEHOLDER_KEY: &str = "paste_your_key_here";

/// Desktop browser user agent; many clinic sites block obvious bots
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A validated search API key
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate a raw key. Blank keys and the placeholder are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == PLACEHOLDER_KEY {
            return Err(Error::Auth(format!(
                "{API_KEY_ENV} is not set. Add your SerpAPI key to the environment or .env"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Validate an optional key, as read from the environment
    pub fn from_option(raw: Option<String>) -> Result<Self> {
        match raw {
            Some(raw) => Self::new(raw),
            None => Self::new(String::new()),
        }
    }

    /// Read the key from `SERPAPI_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_option(std::env::var(API_KEY_ENV).ok())
    }

    /// The raw key, for the request query string
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Configuration for an analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL of the search API
    pub serp_base_url: String,

    /// Number of ranked results to compare
    pub num_results: usize,

    /// Optional search location, e.g. "Dallas, Texas, United States"
    pub location: Option<String>,

    /// Timeout for the search API call in seconds
    pub search_timeout_secs: u64,

    /// Timeout for each page download in seconds
    pub page_timeout_secs: u64,

    /// Maximum number of pages downloaded at once
    pub concurrency: usize,

    /// Delay in milliseconds before each page download after the first
    pub rate_limit_ms: u64,

    /// User agent for page downloads
    pub user_agent: String,

    /// CSS selectors for boilerplate regions left out of the word count
    pub exclude_selectors: Vec<String>,

    /// Equipment and technique names reported as "Technology Names"
    pub technology_keywords: Vec<String>,

    /// Headline phrases that mark a location page covering many services
    pub geo_page_signals: Vec<String>,

    /// Headline phrases that mark clinical content about one procedure
    pub procedure_signals: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            serp_base_url: DEFAULT_SERP_BASE_URL.to_string(),
            num_results: 10,
            location: None,
            search_timeout_secs: 30,
            page_timeout_secs: 10,
            concurrency: 1,
            rate_limit_ms: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            exclude_selectors: default_exclude_selectors(),
            technology_keywords: default_technology_keywords(),
            geo_page_signals: to_strings(&[
                "our locations",
                "find a location",
                "locations near",
                "services we offer",
                "our services",
                "get directions",
                "office hours",
            ]),
            procedure_signals: to_strings(&[
                "recovery",
                "candidate",
                "risks",
                "what to expect",
                "procedure",
                "surgery",
                "side effects",
            ]),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Boilerplate regions that do not count as page content
pub fn default_exclude_selectors() -> Vec<String> {
    [
        "nav",
        "header",
        "footer",
        "[role='navigation']",
        ".navbar",
        ".nav",
        ".header",
        ".footer",
        ".menu",
        ".cookie-banner",
        ".cookie-consent",
        "#cookie",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Common procedure technology names
pub fn default_technology_keywords() -> Vec<String> {
    to_strings(&[
        "Mako",
        "ROSA Knee",
        "da Vinci",
        "robotic-assisted",
        "Contoura",
        "WaveLight",
        "iDesign",
        "femtosecond",
        "CoolSculpting",
        "Renuvion",
        "3D imaging",
    ])
}

/// Builder for AnalyzerConfig
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    /// Set the search API base URL
    pub fn serp_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.serp_base_url = url.into();
        self
    }

    /// Set the number of results to compare
    pub fn num_results(mut self, num_results: usize) -> Self {
        self.config.num_results = num_results;
        self
    }

    /// Set the search location
    pub fn location(mut self, location: Option<String>) -> Self {
        self.config.location = location.filter(|l| !l.trim().is_empty());
        self
    }

    /// Set the search API timeout in seconds
    pub fn search_timeout_secs(mut self, secs: u64) -> Self {
        self.config.search_timeout_secs = secs;
        self
    }

    /// Set the per-page timeout in seconds
    pub fn page_timeout_secs(mut self, secs: u64) -> Self {
        self.config.page_timeout_secs = secs;
        self
    }

    /// Set the number of concurrent page downloads, clamped to
    /// `1..=Semaphore::MAX_PERMITS`
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.clamp(1, Semaphore::MAX_PERMITS);
        self
    }

    /// Set the delay between page downloads in milliseconds
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the user agent for page downloads
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the boilerplate selectors
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    /// Set the technology names to look for
    pub fn technology_keywords(mut self, keywords: Vec<String>) -> Self {
        self.config.technology_keywords = keywords;
        self
    }

    /// Set the phrases that mark a geo page
    pub fn geo_page_signals(mut self, signals: Vec<String>) -> Self {
        self.config.geo_page_signals = signals;
        self
    }

    /// Set the phrases that mark a procedure page
    pub fn procedure_signals(mut self, signals: Vec<String>) -> Self {
        self.config.procedure_signals = signals;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

impl AnalyzerConfig {
    /// Create a new builder
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }

    /// Get the per-page timeout as a Duration
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    /// Get the search API timeout as a Duration
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    /// Get the rate limit as a Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Number of results to request from the API. A few extra are asked for
    /// because results without a link get dropped.
    pub fn request_size(&self) -> usize {
        self.num_results.saturating_add(5).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_blank_and_placeholder() {
        assert!(ApiKey::new("").unwrap_err().is_auth());
        assert!(ApiKey::new("   ").unwrap_err().is_auth());
        assert!(ApiKey::new("paste_your_key_here").unwrap_err().is_auth());
        assert!(ApiKey::from_option(None).unwrap_err().is_auth());
    }

    #[test]
    fn test_api_key_is_trimmed_and_redacted() {
        let key = ApiKey::new(" secret-key \n").unwrap();
        assert_eq!(key.expose(), "secret-key");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalyzerConfig::default();

        assert_eq!(config.num_results, 10);
        assert_eq!(config.page_timeout(), Duration::from_secs(10));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.serp_base_url, DEFAULT_SERP_BASE_URL);
        assert!(config.exclude_selectors.iter().any(|s| s == "nav"));
        assert!(config.technology_keywords.iter().any(|s| s == "Mako"));
        assert!(!config.geo_page_signals.is_empty());
        assert!(!config.procedure_signals.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = AnalyzerConfig::builder()
            .num_results(3)
            .location(Some("Dallas, Texas".to_string()))
            .page_timeout_secs(5)
            .concurrency(0)
            .rate_limit_ms(250)
            .build();

        assert_eq!(config.num_results, 3);
        assert_eq!(config.location.as_deref(), Some("Dallas, Texas"));
        assert_eq!(config.page_timeout(), Duration::from_secs(5));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.rate_limit(), Duration::from_millis(250));
        assert_eq!(config.request_size(), 8);
    }

    #[test]
    fn test_blank_location_is_dropped() {
        let config = AnalyzerConfig::builder().location(Some("  ".to_string())).build();
        assert!(config.location.is_none());
    }

    #[test]
    fn test_request_size_is_capped() {
        let config = AnalyzerConfig::builder().num_results(200).build();
        assert_eq!(config.request_size(), 100);

        let config = AnalyzerConfig::builder().num_results(usize::MAX).build();
        assert_eq!(config.request_size(), 100);
    }

    #[test]
    fn test_concurrency_is_clamped_to_semaphore_limit() {
        let config = AnalyzerConfig::builder().concurrency(usize::MAX).build();
        assert_eq!(config.concurrency, Semaphore::MAX_PERMITS);
    }
}
