//! Rate limiting implementation
//!
//! Enforces a minimum interval between outbound requests of one client. The
//! limiter is shared (via `Arc`) by every iterator and direct call created
//! from the same client, so it models a single upstream rate budget.
//!
//! A caller that arrives too early reserves its slot with its own start time
//! and then sleeps for the remainder of the interval. Concurrent callers
//! therefore wait relative to the last *start*, not the last completion.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Minimum-interval rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter enforcing `min_interval` between requests
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Create a limiter that never waits
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Check if throttling is active
    pub fn is_enabled(&self) -> bool {
        !self.min_interval.is_zero()
    }

    /// Wait until a request may be issued
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires before the slot opens.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if !self.is_enabled() {
            return Ok(());
        }

        let wait = self.reserve().await;
        if wait.is_zero() {
            return Ok(());
        }

        debug!("Rate limit: waiting {:?} before next request", wait);
        tokio::select! {
            () = cancel.cancelled() => Err(Error::Cancelled),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }

    /// Record this call's start time and compute how long it must wait
    async fn reserve(&self) -> Duration {
        let mut last = self.last_request.lock().await;
        let now = Instant::now();
        let wait = match *last {
            Some(prev) => {
                let elapsed = now.saturating_duration_since(prev);
                self.min_interval.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        };
        *last = Some(now);
        wait
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.acquire(&CancellationToken::new()).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_second_acquire_waits() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let token = CancellationToken::new();

        let start = Instant::now();
        limiter.acquire(&token).await.unwrap();
        limiter.acquire(&token).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_disabled_never_waits() {
        let limiter = RateLimiter::disabled();
        let token = CancellationToken::new();
        assert!(!limiter.is_enabled());

        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire(&token).await.unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(30));
        let token = CancellationToken::new();
        limiter.acquire(&token).await.unwrap();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let result = limiter.acquire(&token).await;
        assert_eq!(result, Err(Error::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let limiter = RateLimiter::disabled();
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(limiter.acquire(&token).await, Err(Error::Cancelled));
    }

    #[tokio::test]
    async fn test_concurrent_acquirers_all_wait_after_first() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(80)));
        let token = CancellationToken::new();
        limiter.acquire(&token).await.unwrap();

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let limiter = Arc::clone(&limiter);
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                limiter.acquire(&token).await.unwrap();
                Instant::now()
            }));
        }

        for handle in handles {
            let proceeded_at = handle.await.unwrap();
            assert!(proceeded_at.duration_since(start) >= Duration::from_millis(50));
        }
    }
}
