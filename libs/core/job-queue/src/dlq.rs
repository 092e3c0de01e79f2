//! Dead-letter queue drain
//!
//! Reads jobs the broker dead-lettered and hands them to a [`DeadJobSink`].
//! Every delivery is acked, including ones that do not decode, so the
//! dead-letter queue never redelivers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use lapin::message::Delivery;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::delivery::Acknowledger;
use crate::error::QueueError;
use crate::job::DeadJob;
use crate::metrics;

/// Destination for dead-lettered jobs
#[async_trait]
pub trait DeadJobSink: Send + Sync {
    async fn record(&self, job: &DeadJob, received_at: DateTime<Utc>);
}

/// Writes each dead job as an error-level log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl DeadJobSink for TracingSink {
    async fn record(&self, job: &DeadJob, received_at: DateTime<Utc>) {
        error!(
            job_id = %job.id,
            attempts = job.attempts,
            payload = %job.payload,
            received_at = %received_at.to_rfc3339(),
            "Dead-lettered job"
        );
    }
}

/// How a dead-letter delivery was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum DrainOutcome {
    Recorded(DeadJob),
    /// Body was not a job record; acked and dropped.
    Discarded,
}

pub struct DeadLetterDrain<S> {
    sink: Arc<S>,
    queue: String,
    drained: AtomicU64,
}

impl<S: DeadJobSink> DeadLetterDrain<S> {
    pub fn new(sink: Arc<S>, queue: impl Into<String>) -> Self {
        Self {
            sink,
            queue: queue.into(),
            drained: AtomicU64::new(0),
        }
    }

    /// Number of dead jobs recorded so far
    pub fn drained(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }

    pub async fn handle_delivery<A>(&self, data: &[u8], acker: &A) -> Result<DrainOutcome, QueueError>
    where
        A: Acknowledger + ?Sized,
    {
        let outcome = match DeadJob::from_bytes(data) {
            Ok(job) => {
                self.sink.record(&job, Utc::now()).await;
                self.drained.fetch_add(1, Ordering::Relaxed);
                metrics::record_dead_job(&self.queue);
                DrainOutcome::Recorded(job)
            }
            Err(e) => {
                warn!(
                    queue = %self.queue,
                    error = %e,
                    bytes = data.len(),
                    "Discarding malformed dead-letter message"
                );
                DrainOutcome::Discarded
            }
        };

        acker.ack().await?;
        Ok(outcome)
    }

    /// Drain `deliveries` until shutdown is signalled.
    pub async fn run<D>(&self, mut deliveries: D, mut shutdown: watch::Receiver<bool>) -> Result<(), QueueError>
    where
        D: Stream<Item = Result<Delivery, lapin::Error>> + Unpin,
    {
        info!(queue = %self.queue, "Draining dead-letter queue");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                next = deliveries.next() => match next {
                    Some(Ok(delivery)) => {
                        self.handle_delivery(&delivery.data, &delivery.acker).await?;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(QueueError::ConsumerClosed(self.queue.clone())),
                },
            }
        }

        info!(queue = %self.queue, drained = self.drained(), "Dead-letter drain stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct CountingAcker {
        acks: AtomicUsize,
        rejects: AtomicUsize,
    }

    #[async_trait]
    impl Acknowledger for CountingAcker {
        async fn ack(&self) -> Result<(), QueueError> {
            self.acks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn reject(&self) -> Result<(), QueueError> {
            self.rejects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<DeadJob>>);

    #[async_trait]
    impl DeadJobSink for MemorySink {
        async fn record(&self, job: &DeadJob, _received_at: DateTime<Utc>) {
            self.0.lock().await.push(job.clone());
        }
    }

    #[tokio::test]
    async fn test_records_and_acks_dead_job() {
        let sink = Arc::new(MemorySink::default());
        let drain = DeadLetterDrain::new(Arc::clone(&sink), "jobs.dlq");
        let acker = CountingAcker::default();
        let body = br#"{"id":"job-1","type":"email","payload":{"to":"x"},"attempts":2}"#;

        let outcome = drain.handle_delivery(body, &acker).await.unwrap();

        let expected = DeadJob {
            id: "job-1".to_string(),
            attempts: 2,
            payload: json!({"to": "x"}),
        };
        assert_eq!(outcome, DrainOutcome::Recorded(expected.clone()));
        assert_eq!(*sink.0.lock().await, vec![expected]);
        assert_eq!(acker.acks.load(Ordering::SeqCst), 1);
        assert_eq!(acker.rejects.load(Ordering::SeqCst), 0);
        assert_eq!(drain.drained(), 1);
    }

    #[tokio::test]
    async fn test_malformed_message_is_acked_and_dropped() {
        let sink = Arc::new(MemorySink::default());
        let drain = DeadLetterDrain::new(Arc::clone(&sink), "jobs.dlq");
        let acker = CountingAcker::default();

        let outcome = drain.handle_delivery(b"\x00garbage", &acker).await.unwrap();

        assert_eq!(outcome, DrainOutcome::Discarded);
        assert!(sink.0.lock().await.is_empty());
        assert_eq!(acker.acks.load(Ordering::SeqCst), 1);
        assert_eq!(drain.drained(), 0);
    }
}
