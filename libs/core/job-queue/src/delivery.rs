//! Settling deliveries
//!
//! The worker only ever acks or rejects-without-requeue. Keeping that behind a
//! trait lets the retry state machine run against an in-memory broker.

use async_trait::async_trait;
use lapin::acker::Acker;
use lapin::options::{BasicAckOptions, BasicRejectOptions};

use crate::error::QueueError;

#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Remove the delivery from its queue.
    async fn ack(&self) -> Result<(), QueueError>;

    /// Reject without requeue. On a queue with a dead-letter exchange the
    /// broker forwards the message there.
    async fn reject(&self) -> Result<(), QueueError>;
}

#[async_trait]
impl Acknowledger for Acker {
    async fn ack(&self) -> Result<(), QueueError> {
        Acker::ack(self, BasicAckOptions::default()).await?;
        Ok(())
    }

    async fn reject(&self) -> Result<(), QueueError> {
        Acker::reject(self, BasicRejectOptions { requeue: false }).await?;
        Ok(())
    }
}
