//! Liveness tests
//!
//! Drive the registry and the background sweeper together on a paused tokio
//! clock, with the registry's own clock advanced in step.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration};
use domain_workers::*;
use tokio::sync::watch;

fn manual_registry() -> (Arc<Registry>, Arc<ManualClock>) {
    let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let registry = Arc::new(Registry::with_clock(clock.clone()));
    (registry, clock)
}

/// Advance both clocks by one second, `secs` times, yielding to the sweeper.
async fn tick(clock: &ManualClock, secs: u64) {
    for _ in 0..secs {
        clock.advance(Duration::seconds(1));
        tokio::time::advance(StdDuration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_only_heartbeating_worker_survives_sweep() {
    let (registry, clock) = manual_registry();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(registry.clone(), DEFAULT_SWEEP_INTERVAL, shutdown_rx);

    registry.register("w1").await;
    registry.register("w2").await;

    tick(&clock, 10).await;
    registry.update_load("w1", 1).await;
    tick(&clock, 12).await;

    let workers = registry.list().await;
    let ids: Vec<&str> = workers.iter().map(|w| w.worker_id.as_str()).collect();
    assert_eq!(ids, vec!["w1"]);
    assert_eq!(workers[0].load, 1);

    shutdown_tx.send(true).unwrap();
    sweeper.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_silent_worker_gone_within_ttl_plus_sweep_interval() {
    let (registry, clock) = manual_registry();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(registry.clone(), DEFAULT_SWEEP_INTERVAL, shutdown_rx);

    registry.register("w1").await;
    // One second of slack for the sweeper's first tick.
    tick(&clock, (DEFAULT_WORKER_TTL_SECS as u64) + DEFAULT_SWEEP_INTERVAL.as_secs() + 1).await;

    assert!(registry.is_empty().await);

    drop(shutdown_tx);
    sweeper.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_stops_on_shutdown() {
    let (registry, _clock) = manual_registry();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(registry, DEFAULT_SWEEP_INTERVAL, shutdown_rx);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(StdDuration::from_secs(1), sweeper)
        .await
        .expect("sweeper did not stop")
        .unwrap();
}
