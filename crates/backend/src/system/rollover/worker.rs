use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use super::service;
use contracts::system::rollover::RolloverOutcome;

/// Background worker that checks whether a month rollover is due.
///
/// The check itself is idempotent, so a generous interval is fine: the worst
/// case after a restart is one interval of delay before last month is
/// archived.
pub struct RolloverWorker {
    interval_seconds: u64,
}

impl RolloverWorker {
    pub fn new(interval_seconds: u64) -> Self {
        Self { interval_seconds }
    }

    pub async fn run_loop(&self) {
        info!(
            "Rollover worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            match service::run_monthly_rollover().await {
                Ok(RolloverOutcome::AlreadyCurrent) => {}
                Ok(outcome) => info!("Rollover check finished: {:?}", outcome),
                Err(e) => error!("Rollover check failed: {:?}", e),
            }
        }
    }
}
