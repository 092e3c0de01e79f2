//! Periodic expiry of silent workers

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::registry::Registry;

/// How often the sweeper runs by default.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Spawn a task calling [`Registry::cleanup_expired`] every `interval` until
/// `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_sweeper(
    registry: Arc<Registry>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(interval_ms = interval.as_millis() as u64, "Worker sweeper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = registry.cleanup_expired().await;
                    if !removed.is_empty() {
                        debug!(removed = removed.len(), "Sweep removed expired workers");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Worker sweeper stopped");
    })
}
