//! Transport abstraction
//!
//! A transport performs exactly one remote call for one window and classifies
//! any failure. Retrying, rate limiting and cancellation races are layered on
//! top by the client, so implementations stay single-shot.

use crate::error::Result;
use crate::pagination::RequestWindow;
use crate::query::Query;
use crate::types::SearchResults;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One-shot remote search call
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `window` of the results for `query`
    ///
    /// Failures must be classified: throttling, timeouts and connection
    /// problems are retryable; malformed responses and unexpected statuses
    /// are fatal.
    async fn perform_request(
        &self,
        query: &Query,
        window: RequestWindow,
        cancel: &CancellationToken,
    ) -> Result<SearchResults>;
}
