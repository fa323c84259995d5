//! Retry with exponential backoff.
//!
//! A small combinator shared by every provider: run an async operation up to
//! `max_attempts` times, sleeping `base_delay * 2^attempt` between attempts.
//! Errors are classified through [`Retryable`] so terminal failures stop the
//! loop immediately.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::errors::{GeocodingError, RetryClass};

/// Default number of attempts per provider.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default delay before the second attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn retry_class(&self) -> RetryClass;
}

impl Retryable for GeocodingError {
    fn retry_class(&self) -> RetryClass {
        GeocodingError::retry_class(self)
    }
}

/// Attempt count and base delay for [`retry_with_backoff`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

/// Runs `op` until it succeeds, returns a non-retryable error, or the policy
/// runs out of attempts.
///
/// `op` receives the 0-based attempt number. No delay follows the final
/// attempt; the last error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let is_last = attempt + 1 >= attempts;
                if is_last || err.retry_class() != RetryClass::Retry {
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                debug!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt + 1,
                    attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
