//! Job worker
//!
//! Consumes the work queue one delivery at a time and settles each delivery
//! according to the handler result and the [`RetryPolicy`]:
//!
//! | handler | policy        | original delivery      | republished      |
//! |---------|---------------|------------------------|------------------|
//! | Ok      | -             | ack                    | -                |
//! | Err     | retry         | ack                    | attempts + 1     |
//! | Err     | exhausted     | reject, no requeue     | - (broker → DLQ) |
//! | -       | undecodable   | reject, no requeue     | - (broker → DLQ) |
//!
//! On retry the original is acked before the copy is published. If that
//! publish fails the job is lost; this is logged at error level and counted
//! in `job_queue_lost_jobs_total`.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use futures::{Stream, StreamExt};
use lapin::message::Delivery;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::delivery::Acknowledger;
use crate::error::QueueError;
use crate::handler::JobHandler;
use crate::job::Job;
use crate::metrics;
use crate::producer::JobPublisher;
use crate::retry::{FailureAction, RetryPolicy};

/// How a single delivery was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// A copy carrying `attempts` was published.
    Retried { attempts: u32 },
    /// Rejected for the broker to dead-letter; `attempts` is the count it left with.
    DeadLettered { attempts: u32 },
    /// Body was not a job. Rejected without requeue.
    Discarded,
    /// Original acked but the retry copy could not be published.
    Lost { attempts: u32 },
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded => "succeeded",
            Outcome::Retried { .. } => "retried",
            Outcome::DeadLettered { .. } => "dead_lettered",
            Outcome::Discarded => "discarded",
            Outcome::Lost { .. } => "lost",
        }
    }
}

/// Decrements the in-flight gauge when the handler returns or panics.
struct InFlight<'a>(&'a AtomicI64);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicI64) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct JobWorker<H> {
    handler: Arc<H>,
    publisher: Arc<dyn JobPublisher>,
    policy: RetryPolicy,
    queue: String,
    in_flight: Arc<AtomicI64>,
}

impl<H: JobHandler> JobWorker<H> {
    pub fn new(
        handler: Arc<H>,
        publisher: Arc<dyn JobPublisher>,
        policy: RetryPolicy,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            handler,
            publisher,
            policy,
            queue: queue.into(),
            in_flight: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Shared count of jobs currently inside the handler. Reported as load.
    pub fn in_flight(&self) -> Arc<AtomicI64> {
        Arc::clone(&self.in_flight)
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Process one delivery body and settle it through `acker`.
    ///
    /// Errors are broker failures while settling; handler failures are
    /// reported through the returned [`Outcome`].
    pub async fn handle_delivery<A>(&self, data: &[u8], acker: &A) -> Result<Outcome, QueueError>
    where
        A: Acknowledger + ?Sized,
    {
        let job = match Job::from_bytes(data) {
            Ok(job) => job,
            Err(e) => {
                warn!(queue = %self.queue, error = %e, "Rejecting undecodable message");
                acker.reject().await?;
                return Ok(self.finish(Outcome::Discarded));
            }
        };

        debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            attempts = job.attempts,
            handler = self.handler.name(),
            "Handling job"
        );

        let result = {
            let _guard = InFlight::enter(&self.in_flight);
            self.handler.handle(&job).await
        };

        let err = match result {
            Ok(()) => {
                acker.ack().await?;
                debug!(job_id = %job.id, "Job succeeded");
                return Ok(self.finish(Outcome::Succeeded));
            }
            Err(e) => e,
        };

        match self.policy.on_failure(&job) {
            FailureAction::Retry(next) => {
                acker.ack().await?;
                match self.publisher.publish(&next).await {
                    Ok(()) => {
                        warn!(
                            job_id = %job.id,
                            attempts = next.attempts,
                            max_attempts = self.policy.max_attempts(),
                            error = %err,
                            "Job failed, republished for retry"
                        );
                        Ok(self.finish(Outcome::Retried {
                            attempts: next.attempts,
                        }))
                    }
                    Err(publish_err) => {
                        error!(
                            job_id = %job.id,
                            attempts = next.attempts,
                            error = %publish_err,
                            handler_error = %err,
                            "Retry publish failed after ack, job lost"
                        );
                        metrics::record_lost_job(&self.queue);
                        Ok(self.finish(Outcome::Lost {
                            attempts: next.attempts,
                        }))
                    }
                }
            }
            FailureAction::DeadLetter => {
                acker.reject().await?;
                warn!(
                    job_id = %job.id,
                    attempts = job.attempts,
                    error = %err,
                    "Retries exhausted, job dead-lettered"
                );
                Ok(self.finish(Outcome::DeadLettered {
                    attempts: job.attempts,
                }))
            }
        }
    }

    fn finish(&self, outcome: Outcome) -> Outcome {
        metrics::record_outcome(&self.queue, outcome.as_str());
        outcome
    }

    /// Consume `deliveries` until shutdown is signalled.
    ///
    /// Returns an error if the broker closes the stream or a delivery cannot
    /// be settled; the caller decides whether to reconnect or exit.
    pub async fn run<S>(&self, mut deliveries: S, mut shutdown: watch::Receiver<bool>) -> Result<(), QueueError>
    where
        S: Stream<Item = Result<Delivery, lapin::Error>> + Unpin,
    {
        info!(
            queue = %self.queue,
            handler = self.handler.name(),
            max_attempts = self.policy.max_attempts(),
            "Starting job worker"
        );

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

        info!(queue = %self.queue, "Job worker stopped");
        Ok(())
    }
}
