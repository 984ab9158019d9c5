//! Scheduled reconciliation.
//!
//! The first pass runs one period after `start()`. Ticks missed while a pass
//! overran are skipped, never run back to back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::reconciler::PriceReconciler;

pub struct ReconciliationTask {
    reconciler: Arc<PriceReconciler>,
    period: Duration,
}

impl ReconciliationTask {
    pub fn new(reconciler: Arc<PriceReconciler>, period: Duration) -> Self {
        Self { reconciler, period }
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn start(self) -> ReconciliationHandle {
        let (shutdown, rx) = watch::channel(false);
        info!(period_secs = self.period.as_secs(), "[bv-04] Price reconciliation scheduled");
        let join = tokio::spawn(run(self.reconciler, self.period, rx));
        ReconciliationHandle { shutdown, join }
    }
}

/// Owner's handle on a running [`ReconciliationTask`].
pub struct ReconciliationHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReconciliationHandle {
    /// Ask the loop to exit and wait for it. A pass in flight completes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

async fn run(
    reconciler: Arc<PriceReconciler>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = reconciler.tick().await;
                debug!(checked = report.checked, "[bv-04] Scheduled pass done");
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("[bv-04] Price reconciliation stopped");
                    return;
                }
            }
        }
    }
}
