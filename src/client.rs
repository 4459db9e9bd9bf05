//! arXiv client
//!
//! [`ArxivClient`] wires the pieces together: every attempt first waits on the
//! shared [`RateLimiter`], then makes one [`Transport`] call, all under the
//! client's [`RetryPolicy`] and the caller's cancellation token.

use crate::engine::PaperIterator;
use crate::error::{Error, Result};
use crate::http::{retry, HttpConfig, HttpTransport, RateLimiter, RetryPolicy, Transport};
use crate::pagination::{Paginator, RequestWindow};
use crate::query::Query;
use crate::types::{Paper, SearchResults};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Items requested per window unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Minimum gap between request starts
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Attempts per window, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Base delay between retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Client-wide settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Items per window
    pub page_size: usize,
    /// Cap on items an iterator yields, 0 for unlimited
    pub total_limit: usize,
    /// Minimum gap between request starts, zero disables throttling
    pub min_request_interval: Duration,
    pub retry: RetryPolicy,
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            total_limit: 0,
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
            retry: RetryPolicy::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY),
            http: HttpConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Replace zero or empty values with defaults; a zero request interval is kept
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.retry.max_attempts == 0 {
            self.retry.max_attempts = DEFAULT_MAX_ATTEMPTS;
        }
        if self.retry.delay.is_zero() {
            self.retry.delay = DEFAULT_RETRY_DELAY;
        }
        if self.http.timeout.is_zero() {
            self.http.timeout = crate::http::DEFAULT_TIMEOUT;
        }
        if self.http.user_agent.trim().is_empty() {
            self.http.user_agent = HttpConfig::default().user_agent;
        }
        self
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn total_limit(mut self, limit: usize) -> Self {
        self.config.total_limit = limit;
        self
    }

    pub fn min_request_interval(mut self, interval: Duration) -> Self {
        self.config.min_request_interval = interval;
        self
    }

    /// Disable client-side throttling
    pub fn no_rate_limit(self) -> Self {
        self.min_request_interval(Duration::ZERO)
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.http.user_agent = agent.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.http.base_url = url.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config.normalized()
    }
}

/// Client for the arXiv query API
///
/// Cheap to clone; clones share the rate limiter and transport.
#[derive(Clone)]
pub struct ArxivClient {
    config: Arc<ClientConfig>,
    limiter: Arc<RateLimiter>,
    transport: Arc<dyn Transport>,
}

impl ArxivClient {
    /// Client with default settings against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Client speaking HTTP with the given settings
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let config = config.normalized();
        let transport = HttpTransport::new(config.http.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let config = config.normalized();
        let limiter = RateLimiter::new(config.min_request_interval);
        Self {
            config: Arc::new(config),
            limiter: Arc::new(limiter),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch a single page
    ///
    /// Honors `query.start` and `query.max_results`, falling back to the
    /// configured page size.
    pub async fn search(&self, query: &Query, cancel: &CancellationToken) -> Result<SearchResults> {
        let size = query.max_results.unwrap_or(self.config.page_size);
        self.fetch_window(query, RequestWindow::new(query.start, size), cancel)
            .await
    }

    /// Look up one paper by its arXiv identifier
    pub async fn get_by_id(&self, id: &str, cancel: &CancellationToken) -> Result<Paper> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::invalid("paper id must not be empty"));
        }
        let query = Query::ids([id]).with_max_results(1);
        let results = self.search(&query, cancel).await?;
        results
            .papers
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(id))
    }

    /// Lazily iterate every matching paper, window by window
    pub fn iter(&self, query: Query, cancel: CancellationToken) -> PaperIterator {
        PaperIterator::new(self.clone(), query, cancel)
    }

    /// Paginator for `query`, applying its per-query overrides
    pub(crate) fn paginator_for(&self, query: &Query) -> Paginator {
        Paginator::new(
            query.max_results.unwrap_or(self.config.page_size),
            query.limit.unwrap_or(self.config.total_limit),
        )
    }

    /// Fetch one window with rate limiting, retries and cancellation
    pub(crate) async fn fetch_window(
        &self,
        query: &Query,
        window: RequestWindow,
        cancel: &CancellationToken,
    ) -> Result<SearchResults> {
        query.validate()?;

        retry::execute(&self.config.retry, cancel, move |attempt| async move {
            self.limiter.acquire(cancel).await?;
            debug!("Requesting window {} (attempt {})", window, attempt);
            tokio::select! {
                () = cancel.cancelled() => Err(Error::Cancelled),
                result = self.transport.perform_request(query, window, cancel) => result,
            }
        })
        .await
    }
}

impl std::fmt::Debug for ArxivClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArxivClient")
            .field("config", &self.config)
            .field("rate_limited", &self.limiter.is_enabled())
            .finish_non_exhaustive()
    }
}
