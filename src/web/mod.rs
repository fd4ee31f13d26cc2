//! # Web Interface
//!
//! A minimal local web page: a form that takes a keyword and an endpoint that
//! runs the analysis and answers with the HTML report. The server shares only
//! the immutable run configuration between requests.

mod templates;

pub use templates::render_form;

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use crate::pipeline::analyze_keyword;
use crate::report::render_html;

/// State shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AnalyzerConfig,
    /// Raw search API key as read at startup; validated per request
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    keyword: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/analyze", post(analyze))
        .with_state(Arc::new(state))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

/// Serve the web interface until the process is stopped
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("pagecompare web interface listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn form_page() -> impl IntoResponse {
    Html(render_form("", None))
}

async fn analyze(State(state): State<Arc<AppState>>, Form(form): Form<AnalyzeForm>) -> Response {
    let keyword = form.keyword.trim();
    if keyword.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_form("", Some("Please enter a keyword."))),
        )
            .into_response();
    }

    match analyze_keyword(keyword, &state.config, state.api_key.clone()).await {
        Ok(report) => Html(render_html(&report)).into_response(),
        Err(e) => {
            warn!(error = %e, keyword, "Analysis failed");
            (status_for(&e), Html(render_form(keyword, Some(&e.to_string())))).into_response()
        }
    }
}

/// HTTP status for a failed analysis
fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::Auth(_) => StatusCode::UNAUTHORIZED,
        Error::ExternalService(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::Json(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
