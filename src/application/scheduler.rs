use crate::application::refresh::RefreshService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Runs the refresh trigger at start-up and then once per period.
///
/// A refresh in progress always completes; shutdown is observed between
/// refreshes.
pub struct RefreshScheduler {
    refresher: Arc<RefreshService>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<RefreshService>, period: Duration) -> Self {
        // tokio intervals reject a zero period
        let period = period.max(Duration::from_secs(1));
        Self { refresher, period }
    }

    /// Returns the number of refreshes run once `shutdown` flips to true or
    /// its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> usize {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs = 0usize;

        info!(period_secs = self.period.as_secs(), "Refresh scheduler started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.refresher.refresh_all().await;
                    runs += 1;
                    info!(
                        run = runs,
                        elapsed_ms = report.elapsed.as_millis() as u64,
                        "Scheduled refresh complete"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(runs, "Refresh scheduler stopped");
        runs
    }
}
