//! HTTP layer
//!
//! # Features
//!
//! - **Transport**: one-shot, classified calls to the query API
//! - **Rate Limiting**: minimum interval between request starts
//! - **Retries**: attempt budget with constant, linear or exponential backoff

mod client;
mod rate_limit;
pub mod retry;
mod transport;

pub use client::{
    build_params, classify_status, HttpConfig, HttpConfigBuilder, HttpTransport,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use transport::Transport;
