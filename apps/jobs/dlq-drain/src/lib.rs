//! Dead-letter drain
//!
//! Consumes `jobs.dlq` and logs every dead job at error level with its id,
//! final attempt count and payload. Messages are always acked.

use std::sync::Arc;

use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{AmqpConfig, Environment, FromEnv};
use eyre::{Result, WrapErr};
use job_queue::{
    connect, open_consumer, shutdown, DeadLetterDrain, QueueConfig, Topology, TracingSink,
};
use tracing::info;

const CONSUMER_TAG: &str = "dlq-drain";

pub async fn run() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let amqp = AmqpConfig::from_env().wrap_err("Failed to load AMQP configuration")?;
    let queue = QueueConfig::from_env().wrap_err("Failed to load queue configuration")?;

    let connection = connect(&amqp, CONSUMER_TAG)
        .await
        .wrap_err("Failed to connect to broker")?;
    let channel = connection
        .create_channel()
        .await
        .wrap_err("Failed to open broker channel")?;
    Topology::new(queue.clone())
        .declare(&channel)
        .await
        .wrap_err("Failed to declare broker topology")?;

    let consumer = open_consumer(&channel, &queue.dead_letter_queue, CONSUMER_TAG, None)
        .await
        .wrap_err("Failed to start dead-letter consumer")?;

    let (_shutdown_tx, shutdown_rx) = shutdown::spawn_signal_listener();
    let drain = DeadLetterDrain::new(Arc::new(TracingSink), queue.dead_letter_queue.clone());

    info!(queue = %queue.dead_letter_queue, "Waiting for dead-lettered jobs...");
    let result = drain.run(consumer, shutdown_rx).await;

    let _ = connection.close(0, "shutdown").await;
    result.wrap_err("Dead-letter drain failed")?;

    info!(drained = drain.drained(), "Dead-letter drain stopped");
    Ok(())
}
