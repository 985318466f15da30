use async_trait::async_trait;
use cpa_sync_core::{FetchError, RetryPolicy, Sleeper, TokioSleeper};
use std::sync::Arc;

use crate::{FetchedBatch, StatsSource};

/// Wraps a source so transient failures are retried with linear backoff.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<S: StatsSource> RetryingSource<S> {
    /// Wraps `inner`, sleeping on the tokio timer between attempts.
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, Arc::new(TokioSleeper))
    }

    /// Wraps `inner` with a custom sleeper.
    pub fn with_sleeper(inner: S, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S: StatsSource> StatsSource for RetryingSource<S> {
    async fn fetch(&self) -> Result<FetchedBatch, FetchError> {
        self.policy
            .run(self.sleeper.as_ref(), |attempt| {
                tracing::debug!(source = self.inner.name(), attempt, "Fetching stats");
                self.inner.fetch()
            })
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
