//! HTTP page loader

use std::time::Duration;

use reqwest::Client as ReqwestClient;
use reqwest::redirect::Policy;
use tracing::{debug, instrument, warn};

use super::{PageFetchError, PageLoader, PageRecord};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::serp::SearchResult;

/// Maximum number of redirects followed per page
const MAX_REDIRECTS: usize = 10;

/// Loads pages over HTTP with a per-request timeout
#[derive(Clone)]
pub struct HttpPageLoader {
    /// The underlying reqwest client
    client: ReqwestClient,
}

impl HttpPageLoader {
    /// Create a loader using the page timeout and user agent from the config
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        Self::with_timeout(&config.user_agent, config.page_timeout())
    }

    /// Create a loader with an explicit timeout
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> std::result::Result<String, PageFetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageFetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl PageLoader for HttpPageLoader {
    #[instrument(skip(self, result), fields(rank = result.rank, url = %result.url))]
    async fn load(&self, result: SearchResult) -> PageRecord {
        debug!("Loading page");
        match self.fetch(&result.url).await {
            Ok(html) => {
                debug!("Loaded {} bytes", html.len());
                PageRecord::loaded(result, html)
            }
            Err(e) => {
                warn!("Failed to load page: {}", e);
                PageRecord::failed(result, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;

    fn result_for(url: String) -> SearchResult {
        SearchResult {
            rank: 1,
            url,
            title: "Test".to_string(),
            snippet: String::new(),
        }
    }

    fn loader(timeout: Duration) -> HttpPageLoader {
        HttpPageLoader::with_timeout("pagecompare-test", timeout).unwrap()
    }

    #[tokio::test]
    async fn test_load_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/lasik")
            .match_header("user-agent", "pagecompare-test")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><h1>LASIK</h1></body></html>")
            .expect(1)
            .create_async()
            .await;

        let record = loader(Duration::from_secs(5))
            .load(result_for(format!("{}/lasik", server.url())))
            .await;

        assert_eq!(
            record.body.as_deref(),
            Ok("<html><body><h1>LASIK</h1></body></html>")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_recorded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let record = loader(Duration::from_secs(5))
            .load(result_for(format!("{}/missing", server.url())))
            .await;

        assert_eq!(record.body, Err(PageFetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let mut server = Server::new_async().await;
        let _moved = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", "/new")
            .create_async()
            .await;
        let _target = server
            .mock("GET", "/new")
            .with_status(200)
            .with_body("<p>moved here</p>")
            .create_async()
            .await;

        let record = loader(Duration::from_secs(5))
            .load(result_for(format!("{}/old", server.url())))
            .await;

        assert_eq!(record.body.as_deref(), Ok("<p>moved here</p>"));
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/slow")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(b"<html></html>")
            })
            .create_async()
            .await;

        let record = loader(Duration::from_millis(200))
            .load(result_for(format!("{}/slow", server.url())))
            .await;

        assert_eq!(record.body, Err(PageFetchError::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let record = loader(Duration::from_secs(5))
            .load(result_for("http://127.0.0.1:1/".to_string()))
            .await;

        assert!(matches!(record.body, Err(PageFetchError::Network(_))));
    }
}
