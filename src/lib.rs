// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # arxiv-pager
//!
//! An async client for the arXiv query API that walks arbitrarily large
//! result sets one window at a time.
//!
//! ## Features
//!
//! - **Lazy Pagination**: pull papers with `poll_next` or as a `Stream`
//! - **Rate Limiting**: minimum interval between request starts, shared per client
//! - **Retries**: transient failures retried with constant, linear or exponential backoff
//! - **Cancellation**: every wait and request races a `CancellationToken`
//! - **Limits**: cap the number of papers without over-fetching
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arxiv_pager::{ArxivClient, Query};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> arxiv_pager::Result<()> {
//! let client = ArxivClient::new()?;
//! let query = Query::builder().category("cs.AI").limit(100).build()?;
//!
//! let mut papers = client.iter(query, CancellationToken::new());
//! while let Some(paper) = papers.poll_next().await? {
//!     println!("{} {}", paper.id, paper.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      PaperIterator                          │
//! │  poll_next()   stream()   try_stream()   collect_n()        │
//! └─────────────────────────────────────────────────────────────┘
//!          │ IterationState + Paginator → RequestWindow
//! ┌────────┴────────────────────────────────────────────────────┐
//! │                       ArxivClient                           │
//! │   RetryPolicy  ──►  RateLimiter  ──►  Transport             │
//! └─────────────────────────────────────────────────────────────┘
//!                                             │
//!                            HttpTransport (reqwest) → Atom decode
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Paper, result page and enum types
pub mod types;

/// Search queries and the query builder
pub mod query;

/// Transport, retry and rate limiting
pub mod http;

/// Window arithmetic and stop conditions
pub mod pagination;

/// Atom response decoding
pub mod decode;

/// Iterator and state machine
pub mod engine;

/// The client facade
pub mod client;

/// Settings files
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ArxivClient, ClientConfig, ClientConfigBuilder};
pub use config::ClientSettings;
pub use engine::{IterationState, PaperIterator, Phase};
pub use error::{Error, Result, TransientKind};
pub use http::{HttpConfig, HttpTransport, RateLimiter, RetryPolicy, Transport};
pub use pagination::{Paginator, RequestWindow};
pub use query::{Query, QueryBuilder};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
