//! HTTP transport for the arXiv query API
//!
//! Performs a single GET per call and classifies the outcome:
//! - 429 and 503 are throttling, retryable
//! - 500, 502, 504 and the 52x proxy family are retryable network errors
//! - timeouts and connection failures are retryable
//! - any other status, or a body that does not decode, is fatal
//!
//! Retries and rate limiting live one layer up, in [`crate::ArxivClient`].

use super::transport::Transport;
use crate::decode::{AtomDecoder, FeedDecoder};
use crate::error::{Error, Result};
use crate::pagination::RequestWindow;
use crate::query::Query;
use crate::types::SearchResults;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Public query endpoint
pub const DEFAULT_BASE_URL: &str = "https://export.arxiv.org/api/query";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Query endpoint URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("arxiv-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn builder() -> HttpConfigBuilder {
        HttpConfigBuilder::default()
    }
}

/// Builder for [`HttpConfig`]
#[derive(Debug, Default)]
pub struct HttpConfigBuilder {
    config: HttpConfig,
}

impl HttpConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout; zero keeps the default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.config.timeout = timeout;
        }
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> HttpConfig {
        self.config
    }
}

/// [`Transport`] backed by reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    config: HttpConfig,
    decoder: Arc<dyn FeedDecoder>,
}

impl HttpTransport {
    /// Create a transport decoding Atom responses
    pub fn new(config: HttpConfig) -> Result<Self> {
        Self::with_decoder(config, Arc::new(AtomDecoder::new()))
    }

    /// Create a transport with a custom response decoder
    pub fn with_decoder(config: HttpConfig, decoder: Arc<dyn FeedDecoder>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::invalid(format!("invalid base URL '{}': {e}", config.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::invalid(format!(
                "base URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let timeout = if config.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            config.timeout
        };
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            config,
            decoder,
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    async fn send(&self, query: &Query, window: RequestWindow) -> Result<SearchResults> {
        let params = build_params(query, window);
        debug!(
            "GET {} offset={} size={}",
            self.base_url, window.offset, window.size
        );

        let response = self
            .client
            .get(self.base_url.clone())
            .query(&params)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body = response.text().await.map_err(classify_reqwest_error)?;
        let results = self.decoder.decode(&body)?;
        debug!(
            "Decoded {} papers (start={}, total={})",
            results.len(),
            results.start_index,
            results.total_results
        );
        Ok(results)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform_request(
        &self,
        query: &Query,
        window: RequestWindow,
        cancel: &CancellationToken,
    ) -> Result<SearchResults> {
        tokio::select! {
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.send(query, window) => result,
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Query-string parameters for one window
///
/// An id list takes precedence over the search expression. `start` is only
/// sent when non-zero.
pub fn build_params(query: &Query, window: RequestWindow) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(5);

    if query.id_list.is_empty() {
        let expression = query.effective_search_query();
        if !expression.is_empty() {
            params.push(("search_query", expression));
        }
    } else {
        params.push(("id_list", query.id_list.join(",")));
    }

    if window.offset > 0 {
        params.push(("start", window.offset.to_string()));
    }
    params.push(("max_results", window.size.to_string()));
    params.push(("sortBy", query.sort_by.as_str().to_string()));
    params.push(("sortOrder", query.sort_order.as_str().to_string()));
    params
}

/// Map a non-success status onto the error taxonomy
pub fn classify_status(status: StatusCode, body: &str) -> Error {
    let code = status.as_u16();
    let detail = body.trim();
    let message = if detail.is_empty() {
        format!("HTTP {code}")
    } else {
        format!("HTTP {code}: {}", truncate(detail, 200))
    };

    match code {
        429 | 503 => Error::rate_limited(message),
        500 | 502 | 504 | 520..=524 => Error::network(message),
        _ => Error::http_status(code, message),
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::timeout(err.to_string())
    } else if err.is_builder() {
        Error::fatal(err.to_string())
    } else {
        Error::network(err.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
