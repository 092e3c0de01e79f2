//! Wire-level job records
//!
//! Both records travel as JSON with content type `application/json`:
//!
//! ```json
//! {"id":"7f0c…","type":"email","payload":{"to":"a@b.c"},"attempts":1}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::QueueError;

/// Content type of every message this crate publishes.
pub const CONTENT_TYPE: &str = "application/json";

/// A unit of submitted work.
///
/// `payload` is never interpreted by the queue, only carried. `attempts`
/// only ever grows, and only through [`Job::with_retry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,

    #[serde(rename = "type")]
    pub job_type: String,

    #[serde(default)]
    pub payload: Value,

    #[serde(default)]
    pub attempts: u32,
}

impl Job {
    /// Create a fresh job with a new id and zero attempts.
    pub fn new(job_type: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            job_type: job_type.into(),
            payload,
            attempts: 0,
        }
    }

    /// Copy of this job with the attempt counter advanced by one.
    pub fn with_retry(&self) -> Self {
        Self {
            attempts: self.attempts.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, QueueError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, QueueError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Projection of a job that reached the dead-letter queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadJob {
    pub id: String,

    #[serde(default)]
    pub attempts: u32,

    #[serde(default)]
    pub payload: Value,
}

impl DeadJob {
    pub fn from_bytes(data: &[u8]) -> Result<Self, QueueError> {
        Ok(serde_json::from_slice(data)?)
    }
}

impl From<&Job> for DeadJob {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            attempts: job.attempts,
            payload: job.payload.clone(),
        }
    }
}
