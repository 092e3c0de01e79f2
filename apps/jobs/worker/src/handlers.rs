//! Built-in job handlers
//!
//! | type    | behaviour                                         |
//! |---------|---------------------------------------------------|
//! | `log`   | logs the payload and succeeds                     |
//! | `flaky` | fails until the last allowed attempt, then passes |
//! | `fail`  | always fails (ends up in the dead-letter queue)   |
//!
//! Any other type fails with `UnknownType` and is eventually dead-lettered.

use async_trait::async_trait;
use job_queue::{HandlerError, HandlerRegistry, Job, JobHandler};
use tracing::info;

pub struct LogHandler;

#[async_trait]
impl JobHandler for LogHandler {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        info!(job_id = %job.id, attempts = job.attempts, payload = %job.payload, "Processed job");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Simulates a transient fault: fails while `attempts < max_attempts - 1`.
pub struct FlakyHandler {
    max_attempts: u32,
}

impl FlakyHandler {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }
}

#[async_trait]
impl JobHandler for FlakyHandler {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        if job.attempts.saturating_add(1) < self.max_attempts {
            return Err(HandlerError::failed(format!(
                "simulated failure on attempt {}",
                job.attempts
            )));
        }
        info!(job_id = %job.id, attempts = job.attempts, "Flaky job finally succeeded");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

pub struct FailHandler;

#[async_trait]
impl JobHandler for FailHandler {
    async fn handle(&self, _job: &Job) -> Result<(), HandlerError> {
        Err(HandlerError::failed("job always fails"))
    }

    fn name(&self) -> &'static str {
        "fail"
    }
}

/// Registry with every built-in handler.
pub fn builtin(max_attempts: u32) -> HandlerRegistry {
    HandlerRegistry::new()
        .register("log", LogHandler)
        .register("flaky", FlakyHandler::new(max_attempts))
        .register("fail", FailHandler)
}
