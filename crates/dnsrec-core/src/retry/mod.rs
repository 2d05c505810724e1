//! Retry executor for upstream mutations
//!
//! The upstream API exposes no structured error codes, so transient failures
//! are recognised by matching the rendered error message against a fixed,
//! case-sensitive vocabulary (see [`RETRYABLE_MESSAGES`]). This is a coarse
//! heuristic: a backend that words its transient failures differently will
//! see them treated as fatal.
//!
//! ## Policy
//!
//! - Fatal errors are returned after the first attempt.
//! - Retryable errors are retried every `delay` until `timeout` has elapsed
//!   since the first attempt; then the last error is returned unchanged.
//! - Cancellation wins over everything, including an in-flight attempt.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default overall budget for retries and convergence polls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default delay between attempts
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Default lower bound for any wait between poll ticks
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(1);

/// Message fragments that mark an error as transient
pub const RETRYABLE_MESSAGES: &[&str] = &[
    // API rate limiting
    "rate limit",
    "too many requests",
    // Temporary network issues
    "timeout",
    "connection refused",
    // API temporary unavailability
    "service unavailable",
    "bad gateway",
    "gateway error",
];

/// How long and how often to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Budget measured from the first attempt
    pub timeout: Duration,
    /// Delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy
    pub fn new(timeout: Duration, delay: Duration) -> Self {
        Self { timeout, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_DELAY)
    }
}

/// Check whether an error is worth retrying
///
/// Cancellation and convergence timeouts are never retryable; everything
/// else is classified by its message.
pub fn is_retryable_error(err: &Error) -> bool {
    match err.root() {
        Error::Cancelled | Error::ConvergenceTimeout { .. } => false,
        _ => {
            let message = err.to_string();
            RETRYABLE_MESSAGES
                .iter()
                .any(|fragment| message.contains(fragment))
        }
    }
}

/// Run `operation`, retrying it while it fails with retryable errors
///
/// # Parameters
///
/// - `policy`: Budget and delay
/// - `cancel`: Aborts the current attempt or delay immediately
/// - `operation`: Produces a fresh attempt on every call
///
/// # Returns
///
/// - `Ok(T)`: The first successful attempt
/// - `Err(Error::Cancelled)`: `cancel` fired
/// - `Err(Error)`: The first fatal error, or the last retryable error once
///   the budget is spent
pub async fn retry_on_error<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let deadline = Instant::now() + policy.timeout;
    let mut attempt: usize = 0;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = operation() => result,
        };

        let err = match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !is_retryable_error(&err) {
            debug!(attempt, error = %err, "non-retryable error");
            return Err(err);
        }

        let now = Instant::now();
        if now >= deadline {
            warn!(attempt, error = %err, "retry budget of {:?} exhausted", policy.timeout);
            return Err(err);
        }

        let wait = policy.delay.min(deadline - now);
        warn!(attempt, error = %err, "retryable error, next attempt in {:?}", wait);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
    }
}
