//! Queue error types
//!
//! Handler failures are not errors of the queue itself: they are modelled by
//! [`HandlerError`](crate::HandlerError) and drive the retry state machine.
//! `QueueError` covers the broker plumbing around it.

use thiserror::Error;

/// Broker and codec errors
#[derive(Error, Debug)]
pub enum QueueError {
    /// AMQP connection, channel or protocol error
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The broker refused a publish (publisher confirm came back as nack)
    #[error("Broker rejected publish of job {job_id}")]
    PublishNacked { job_id: String },

    /// The delivery stream ended while the consumer was still running
    #[error("Consumer for queue '{0}' closed unexpectedly")]
    ConsumerClosed(String),
}

impl QueueError {
    /// True for failures of the transport rather than of the message itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            QueueError::Broker(_) | QueueError::PublishNacked { .. } | QueueError::ConsumerClosed(_)
        )
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::Serialization(err.to_string())
    }
}
