//! Retry coordination
//!
//! Runs one fallible operation up to `max_attempts` times. Whether a failure
//! is worth retrying is decided by the failure itself
//! ([`Error::is_retryable`]); the coordinator never inspects messages.
//!
//! The first retry after the very first failure is immediate. The configured
//! delay applies from the second retry onward, escalated by [`BackoffType`].

use crate::error::{Error, Result};
use crate::types::BackoffType;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry policy for one logical operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (>= 1)
    pub max_attempts: u32,
    /// Base delay between retries
    pub delay: Duration,
    /// How the delay grows between consecutive retries
    pub backoff: BackoffType,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff: BackoffType::Constant,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Fixed delay policy
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            ..Self::default()
        }
    }

    /// Single attempt, never retry
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Set the backoff strategy
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, max_delay: Duration) -> Self {
        self.backoff = backoff;
        self.max_delay = max_delay;
        self
    }

    /// Delay for the n-th delayed retry (0-based, i.e. the second retry is 0)
    pub fn calculate_backoff(&self, step: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.delay,
            BackoffType::Linear => self.delay.saturating_mul(step + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(step);
                self.delay.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_delay)
    }
}

/// Progress of one logical operation through its retry budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryContext {
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryContext {
    /// Fresh context for a policy
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: policy.max_attempts.max(1),
            base_delay: policy.delay,
        }
    }

    /// Whether another attempt is allowed
    pub fn has_remaining(&self) -> bool {
        self.attempts_made < self.max_attempts
    }

    /// Delay to sleep before the next attempt
    ///
    /// Zero before the first attempt and before the first retry.
    pub fn next_delay(&self, policy: &RetryPolicy) -> Duration {
        if self.attempts_made <= 1 {
            Duration::ZERO
        } else {
            policy.calculate_backoff(self.attempts_made - 2)
        }
    }
}

/// Execute `operation` under `policy`, honoring `cancel`
///
/// The operation receives the 1-based attempt number. Fatal failures are
/// returned immediately; retryable failures are returned unchanged once the
/// attempts are used up.
pub async fn execute<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut ctx = RetryContext::new(policy);

    loop {
        let delay = ctx.next_delay(policy);
        if !delay.is_zero() {
            tokio::select! {
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        ctx.attempts_made += 1;
        let err = match operation(ctx.attempts_made).await {
            Ok(value) => {
                if ctx.attempts_made > 1 {
                    debug!("Succeeded on attempt {}", ctx.attempts_made);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            return Err(err);
        }
        if !ctx.has_remaining() {
            warn!("Giving up after {} attempts: {}", ctx.attempts_made, err);
            return Err(err);
        }

        warn!(
            "Attempt {}/{} failed, retrying in {:?}: {}",
            ctx.attempts_made,
            ctx.max_attempts,
            ctx.next_delay(policy),
            err
        );
    }
}
