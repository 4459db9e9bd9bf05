//! Error types for arxiv-pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors are `Clone` so a failed iterator can hand the same failure back on
//! every subsequent poll. Underlying library errors are flattened into
//! messages at the point where they are classified.

use std::fmt;
use thiserror::Error;

/// Flavour of a transient transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientKind {
    /// Server asked us to slow down (429 / 503)
    RateLimited,
    /// Request did not complete within the configured timeout
    Timeout,
    /// Connection, DNS, body read or 5xx failure
    Network,
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limit"),
            Self::Timeout => write!(f, "timeout"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// The main error type for arxiv-pager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ============================================================================
    // Cancellation
    // ============================================================================
    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Transient {kind} failure: {message}")]
    RetryableTransport {
        kind: TransientKind,
        message: String,
    },

    #[error("Transport failure: {message}")]
    FatalTransport {
        status: Option<u16>,
        message: String,
    },

    // ============================================================================
    // Caller Errors
    // ============================================================================
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Paper with ID {id} not found")]
    NotFound { id: String },

    // ============================================================================
    // Settings Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a retryable rate-limit error
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RetryableTransport {
            kind: TransientKind::RateLimited,
            message: message.into(),
        }
    }

    /// Create a retryable timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::RetryableTransport {
            kind: TransientKind::Timeout,
            message: message.into(),
        }
    }

    /// Create a retryable network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::RetryableTransport {
            kind: TransientKind::Network,
            message: message.into(),
        }
    }

    /// Create a fatal transport error without a status code
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::FatalTransport {
            status: None,
            message: message.into(),
        }
    }

    /// Create a fatal transport error for an unexpected HTTP status
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::FatalTransport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a settings error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RetryableTransport { .. })
    }

    /// Check if this error came from a cancelled token
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Transient kind, if this is a retryable failure
    pub fn transient_kind(&self) -> Option<TransientKind> {
        match self {
            Error::RetryableTransport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias for arxiv-pager
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid("either a search query or an id list is required");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: either a search query or an id list is required"
        );

        let err = Error::rate_limited("status 429");
        assert_eq!(err.to_string(), "Transient rate_limit failure: status 429");

        let err = Error::not_found("2101.00001");
        assert_eq!(err.to_string(), "Paper with ID 2101.00001 not found");

        let err = Error::http_status(400, "unexpected status 400");
        assert_eq!(err.to_string(), "Transport failure: unexpected status 400");
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::rate_limited("").is_retryable());
        assert!(Error::timeout("").is_retryable());
        assert!(Error::network("").is_retryable());

        assert!(!Error::fatal("bad xml").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::not_found("x").is_retryable());
        assert!(!Error::invalid("x").is_retryable());
    }

    #[test]
    fn test_transient_kind() {
        assert_eq!(
            Error::timeout("slow").transient_kind(),
            Some(TransientKind::Timeout)
        );
        assert_eq!(Error::Cancelled.transient_kind(), None);
        assert!(Error::Cancelled.is_cancelled());
    }
}
