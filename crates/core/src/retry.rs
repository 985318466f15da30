//! Bounded retry with linear backoff.
//!
//! The delay before attempt `n + 1` is `base_delay * n`. Sleeping goes through
//! the [`Sleeper`] trait so callers can substitute a recording sleeper in tests.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::FetchError;

/// Abstraction over waiting between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Creates a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given (1-based) failed attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Runs `operation` until it succeeds, fails non-transiently, or the
    /// attempt budget is spent.
    ///
    /// The closure receives the 1-based attempt number.
    ///
    /// # Errors
    /// Returns the first non-transient error unchanged, or
    /// [`FetchError::RetriesExhausted`] wrapping the last transient error.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = Result<T, FetchError>> + Send,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Network error while fetching stats"
                    );

                    if attempt >= self.max_attempts {
                        error!("Max retries reached, giving up on this fetch");
                        return Err(FetchError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    info!("Retrying in {:.1}s", delay.as_secs_f64());
                    sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
