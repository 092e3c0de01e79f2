//! Job publisher
//!
//! Used by the submission gateway for new jobs and by workers to republish
//! retried jobs.
//!
//! # Example
//!
//! ```rust,ignore
//! use job_queue::{AmqpPublisher, Job, JobPublisher};
//!
//! let publisher = AmqpPublisher::new(&connection, "jobs").await?;
//! publisher.publish(&Job::new("email", payload)).await?;
//! ```

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::{BasicProperties, Channel, Connection};
use tracing::debug;

use crate::error::QueueError;
use crate::job::{CONTENT_TYPE, Job};
use crate::metrics;

/// AMQP delivery mode 2: the broker writes the message to disk.
const PERSISTENT: u8 = 2;

/// Anything that can enqueue a job onto the work queue.
///
/// Implementations do not retry; callers decide what a failed publish means.
#[async_trait]
pub trait JobPublisher: Send + Sync {
    async fn publish(&self, job: &Job) -> Result<(), QueueError>;
}

/// Publishes jobs to a queue through the default exchange, waiting for
/// broker confirmation of every message.
#[derive(Clone)]
pub struct AmqpPublisher {
    channel: Channel,
    queue: String,
}

impl AmqpPublisher {
    /// Open a dedicated confirm-mode channel on `connection`.
    pub async fn new(connection: &Connection, queue: impl Into<String>) -> Result<Self, QueueError> {
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;

        Ok(Self {
            channel,
            queue: queue.into(),
        })
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    fn properties() -> BasicProperties {
        BasicProperties::default()
            .with_content_type(CONTENT_TYPE.into())
            .with_delivery_mode(PERSISTENT)
    }
}

#[async_trait]
impl JobPublisher for AmqpPublisher {
    async fn publish(&self, job: &Job) -> Result<(), QueueError> {
        let body = job.to_bytes()?;

        let confirmation = self
            .channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &body,
                Self::properties(),
            )
            .await?
            .await?;

        if confirmation.is_nack() {
            return Err(QueueError::PublishNacked {
                job_id: job.id.clone(),
            });
        }

        metrics::record_published(&self.queue);
        debug!(
            queue = %self.queue,
            job_id = %job.id,
            attempts = job.attempts,
            "Published job"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_persistent_json() {
        let props = AmqpPublisher::properties();
        assert_eq!(props.delivery_mode(), &Some(PERSISTENT));
        assert_eq!(
            props.content_type().as_ref().map(|ct| ct.as_str()),
            Some(CONTENT_TYPE)
        );
    }
}
