//! Jobs Worker
//!
//! Consumes the `jobs` queue, one job at a time.
//!
//! ## Architecture
//!
//! ```text
//! RabbitMQ [jobs] (prefetch 1)
//!   ↓
//! JobWorker<HandlerRegistry>
//!   ├─ success            → ack
//!   ├─ failure, retries   → ack + republish with attempts + 1
//!   └─ failure, exhausted → reject → [jobs.dlx] → [jobs.dlq]
//!
//! heartbeat task ──gRPC Heartbeat(load = in-flight jobs)──► jobs API
//! ```

pub mod config;
pub mod handlers;
pub mod heartbeat;

use std::sync::Arc;

use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::{Result, WrapErr};
use job_queue::{
    AmqpPublisher, JobWorker, PREFETCH_COUNT, RetryPolicy, Topology, connect, open_consumer,
    shutdown,
};
use tracing::{error, info};

use crate::config::Config;

/// Run the worker
///
/// Startup order: broker connection and topology, then registration with the
/// registry (fatal if it fails), then the heartbeat task and the consumer.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    job_queue::init_metrics();

    info!(
        worker_id = %config.worker_id,
        queue = %config.queue.queue,
        max_attempts = config.queue.max_attempts,
        environment = ?config.environment,
        "Starting jobs worker"
    );

    let connection = connect(&config.amqp, &config.worker_id)
        .await
        .wrap_err("Failed to connect to broker")?;
    let channel = connection
        .create_channel()
        .await
        .wrap_err("Failed to open broker channel")?;
    Topology::new(config.queue.clone())
        .declare(&channel)
        .await
        .wrap_err("Failed to declare broker topology")?;

    let publisher = AmqpPublisher::new(&connection, &config.queue.queue)
        .await
        .wrap_err("Failed to open publisher channel")?;

    let mut registry = heartbeat::connect(&config.registry_url).await?;
    heartbeat::register(&mut registry, &config.worker_id).await?;

    let (shutdown_tx, shutdown_rx) = shutdown::spawn_signal_listener();

    let handlers = Arc::new(handlers::builtin(config.queue.max_attempts));
    let worker = JobWorker::new(
        handlers,
        Arc::new(publisher),
        RetryPolicy::new(config.queue.max_attempts),
        config.queue.queue.clone(),
    );

    let heartbeat = heartbeat::spawn_heartbeat(
        registry,
        config.worker_id.clone(),
        worker.in_flight(),
        config.heartbeat_interval,
        shutdown_rx.clone(),
    );

    let consumer = open_consumer(
        &channel,
        &config.queue.queue,
        &config.worker_id,
        Some(PREFETCH_COUNT),
    )
    .await
    .wrap_err("Failed to start consumer")?;

    info!("Waiting for jobs...");
    let result = worker.run(consumer, shutdown_rx).await;
    if let Err(e) = &result {
        error!(error = %e, "Job worker stopped with error");
    }

    let _ = shutdown_tx.send(true);
    let _ = heartbeat.await;
    let _ = connection.close(0, "shutdown").await;

    result.wrap_err("Job worker failed")?;
    info!(worker_id = %config.worker_id, "Jobs worker stopped");
    Ok(())
}
