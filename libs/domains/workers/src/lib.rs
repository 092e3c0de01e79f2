//! Workers Domain
//!
//! Liveness tracking for job worker processes.
//!
//! Workers register once at startup and then heartbeat periodically. A
//! background sweeper removes any worker that has been silent for longer
//! than the TTL (15s by default), so `list()` only ever shows workers heard
//! from within TTL + sweep interval.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_workers::{spawn_sweeper, Registry, DEFAULT_SWEEP_INTERVAL};
//!
//! # async fn example() {
//! let registry = Arc::new(Registry::new());
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let sweeper = spawn_sweeper(registry.clone(), DEFAULT_SWEEP_INTERVAL, shutdown_rx);
//!
//! registry.register("worker-1").await;
//! registry.update_load("worker-1", 1).await;
//! # }
//! ```

pub mod clock;
pub mod models;
pub mod registry;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use models::WorkerInfo;
pub use registry::{Registry, DEFAULT_WORKER_TTL_SECS};
pub use sweeper::{spawn_sweeper, DEFAULT_SWEEP_INTERVAL};
