//! Decoder trait
//!
//! Defines the seam between the HTTP transport and response parsing.

use crate::error::Result;
use crate::types::SearchResults;

/// Trait for decoding a response body into one page of results
///
/// Any parse failure must be reported as a non-retryable error; a malformed
/// body does not get better by asking again.
pub trait FeedDecoder: Send + Sync {
    fn decode(&self, body: &str) -> Result<SearchResults>;
}
