//! Job Queue
//!
//! A RabbitMQ job queue with bounded retry-by-republish and broker-routed
//! dead-lettering.
//!
//! ## Features
//!
//! - **Durable topology**: work queue, dead-letter exchange and dead-letter
//!   queue declared idempotently by every participant
//! - **Bounded retries**: a failed job is republished with `attempts + 1`
//!   until `max_attempts` deliveries have been made
//! - **Broker dead-lettering**: exhausted jobs are rejected without requeue
//!   and routed to the DLQ by the broker
//! - **Publisher confirms**: every publish waits for the broker
//! - **Prometheus metrics**: per-outcome counters
//!
//! ## Example
//!
//! ```ignore
//! use job_queue::{connect, open_consumer, AmqpPublisher, JobWorker, QueueConfig, RetryPolicy, Topology};
//!
//! let connection = connect(&amqp, "worker").await?;
//! let channel = connection.create_channel().await?;
//! Topology::new(queue.clone()).declare(&channel).await?;
//!
//! let publisher = Arc::new(AmqpPublisher::new(&connection, &queue.queue).await?);
//! let worker = JobWorker::new(handlers, publisher, RetryPolicy::new(queue.max_attempts), &queue.queue);
//! let consumer = open_consumer(&channel, &queue.queue, "worker-1", Some(1)).await?;
//! worker.run(consumer, shutdown_rx).await?;
//! ```

mod config;
mod connection;
mod delivery;
mod dlq;
mod error;
mod handler;
mod job;
pub mod metrics;
mod producer;
mod retry;
pub mod shutdown;
mod topology;
mod worker;

// Re-export main types
pub use config::{
    QueueConfig, DEFAULT_DEAD_LETTER_EXCHANGE, DEFAULT_DEAD_LETTER_QUEUE,
    DEFAULT_DEAD_LETTER_ROUTING_KEY, DEFAULT_MAX_ATTEMPTS, DEFAULT_QUEUE, PREFETCH_COUNT,
};
pub use connection::{connect, open_consumer};
pub use delivery::Acknowledger;
pub use dlq::{DeadJobSink, DeadLetterDrain, DrainOutcome, TracingSink};
pub use error::QueueError;
pub use handler::{HandlerError, HandlerRegistry, JobHandler};
pub use job::{DeadJob, Job, CONTENT_TYPE};
pub use metrics::{init_metrics, render_metrics};
pub use producer::{AmqpPublisher, JobPublisher};
pub use retry::{FailureAction, RetryPolicy};
pub use shutdown::spawn_signal_listener;
pub use topology::{Topology, DEAD_LETTER_EXCHANGE_ARG, DEAD_LETTER_ROUTING_KEY_ARG};
pub use worker::{JobWorker, Outcome};
