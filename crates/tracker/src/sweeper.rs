use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::Tracker;

/// Sweeps right away, then once per `interval` until `shutdown` fires.
///
/// A sweep already in progress always runs to completion.
pub fn spawn_sweeper(tracker: Arc<Tracker>, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::debug!("Retention sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    tracker.sweep().await;
                }
            }
        }
    })
}
