//! Retry policy
//!
//! `attempts` counts failed deliveries already retried. The decision is made
//! before incrementing: a job whose next attempt would reach `max_attempts`
//! is dead-lettered as is, so a job gets exactly `max_attempts` deliveries and
//! arrives in the dead-letter queue carrying `max_attempts - 1`.

use crate::job::Job;

/// What to do with a job whose handler just failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureAction {
    /// Republish this copy (attempts already advanced) and ack the original.
    Retry(Job),
    /// Reject the original without requeue so the broker dead-letters it.
    DeadLetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` deliveries (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn on_failure(&self, job: &Job) -> FailureAction {
        if job.attempts.saturating_add(1) < self.max_attempts {
            FailureAction::Retry(job.with_retry())
        } else {
            FailureAction::DeadLetter
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_ATTEMPTS)
    }
}
