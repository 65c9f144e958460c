//! Bounded retry with backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Delay between two attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `step * attempt`.
    Linear(Duration),
    /// `base * 2^(attempt - 1)`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match *self {
            Backoff::Linear(step) => step.saturating_mul(attempt),
            Backoff::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt - 1);
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear(step),
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { base, max },
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// The last error together with the number of attempts made.
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempt(s): {last_error}")]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Run `operation` until it succeeds, fails with a non-retryable error or
/// the policy is exhausted. The operation receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt >= max_attempts || !is_retryable(&e) {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: e,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    "Attempt {}/{} failed: {}, retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
