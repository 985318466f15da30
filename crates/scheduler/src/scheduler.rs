use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

use crate::refresh::RefreshOrchestrator;

/// Runs a refresh cycle once per interval until shut down.
pub struct RefreshScheduler {
    orchestrator: RefreshOrchestrator,
    interval: Duration,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(orchestrator: RefreshOrchestrator, interval: Duration) -> Self {
        Self {
            orchestrator,
            interval,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs cycles until `shutdown` resolves and returns how many ran.
    ///
    /// The first cycle starts one interval from now. Cycles never overlap,
    /// and shutdown is only observed while waiting for the next tick.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            "Refresh scheduler started"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut cycles = 0;
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.orchestrator.run_cycle().await;
                    cycles += 1;
                }
            }
        }

        info!(cycles, "Refresh scheduler stopped");
        cycles
    }
}
