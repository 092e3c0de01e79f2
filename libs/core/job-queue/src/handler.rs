//! Job handlers
//!
//! A worker runs exactly one [`JobHandler`]. Most deployments use a
//! [`HandlerRegistry`], which is itself a handler and dispatches on
//! [`Job::job_type`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::job::Job;

/// Why a handler did not complete a job. Every variant counts as a failed
/// attempt and goes through the retry policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("Job failed: {0}")]
    Failed(String),

    #[error("No handler registered for job type '{0}'")]
    UnknownType(String),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        HandlerError::Failed(msg.into())
    }
}

/// Business logic for a job.
///
/// Handlers must tolerate being called several times for the same job id:
/// delivery is at least once, and a retried job comes back with a higher
/// `attempts`.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: JobHandler + ?Sized> JobHandler for Arc<T> {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        (**self).handle(job).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Routes jobs to handlers by job type.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `job_type`, replacing any previous one.
    pub fn register(mut self, job_type: impl Into<String>, handler: impl JobHandler + 'static) -> Self {
        self.handlers.insert(job_type.into(), Arc::new(handler));
        self
    }

    pub fn contains(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    pub fn job_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[async_trait]
impl JobHandler for HandlerRegistry {
    async fn handle(&self, job: &Job) -> Result<(), HandlerError> {
        match self.handlers.get(&job.job_type) {
            Some(handler) => handler.handle(job).await,
            None => Err(HandlerError::UnknownType(job.job_type.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}
