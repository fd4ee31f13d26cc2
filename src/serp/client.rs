//! SerpAPI client

use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{SearchProvider, SearchResult, SerpError};
use crate::config::{AnalyzerConfig, ApiKey};

/// Message SerpAPI sends with a 200 when the engine found nothing
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,

    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: String,

    #[serde(default)]
    title: String,

    #[serde(default)]
    snippet: String,
}

/// Client for the SerpAPI Google engine
#[derive(Clone)]
pub struct SerpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// API key sent with every request
    api_key: ApiKey,

    /// Number of ranked results to keep
    num_results: usize,

    /// Number of results to ask the API for
    request_size: usize,

    /// Optional search location
    location: Option<String>,
}

impl SerpClient {
    /// Create a client from an API key and the run configuration
    pub fn new(api_key: ApiKey, config: &AnalyzerConfig) -> Result<Self, SerpError> {
        let client = ReqwestClient::builder()
            .timeout(config.search_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.serp_base_url.trim_end_matches('/').to_string(),
            api_key,
            num_results: config.num_results,
            request_size: config.request_size(),
            location: config.location.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }

    fn query_params(&self, keyword: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", "google".to_string()),
            ("q", keyword.to_string()),
            ("api_key", self.api_key.expose().to_string()),
            ("num", self.request_size.to_string()),
        ];
        if let Some(location) = &self.location {
            params.push(("location", location.clone()));
        }
        params
    }

    /// Turn the raw API payload into ranked results
    fn parse_results(&self, body: &str) -> Result<Vec<SearchResult>, SerpError> {
        let response: SerpResponse = serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse search response: {}", e);
            SerpError::MalformedResponse(e.to_string())
        })?;

        if let Some(message) = response.error {
            if message.contains(NO_RESULTS_MARKER) {
                info!("Search returned no results");
                return Ok(Vec::new());
            }
            let lower = message.to_lowercase();
            if lower.contains("api key") || lower.contains("api_key") {
                return Err(SerpError::Auth(message));
            }
            return Err(SerpError::Api {
                status_code: StatusCode::OK.as_u16(),
                message,
            });
        }

        // Ranks follow the API order, so they are assigned before results
        // without a link are dropped.
        let results = response
            .organic_results
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let url = item.link.trim().to_string();
                if url.is_empty() {
                    warn!("Skipping result {} without a link", index + 1);
                    return None;
                }
                Some(SearchResult {
                    rank: index + 1,
                    url,
                    title: item.title,
                    snippet: item.snippet,
                })
            })
            .take(self.num_results)
            .collect();

        Ok(results)
    }
}

impl SearchProvider for SerpClient {
    #[instrument(skip(self))]
    async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, SerpError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SerpError::EmptyKeyword);
        }

        debug!("Sending search request for {}", keyword);
        let response = self
            .client
            .get(self.search_url())
            .query(&self.query_params(keyword))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("Search API rejected the key: {}", status);
            let message = serde_json::from_str::<SerpResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| "Invalid API key".to_string());
            return Err(SerpError::Auth(message));
        }

        if !status.is_success() {
            error!("Search API error: {} - {}", status, body);
            return Err(SerpError::Api {
                status_code: status.as_u16(),
                message: body,
            });
        }

        let results = self.parse_results(&body)?;
        info!("Search returned {} results", results.len());
        Ok(results)
    }
}
