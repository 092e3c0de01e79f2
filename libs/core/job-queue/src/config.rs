//! Queue configuration
//!
//! Names of the broker objects and the retry limit. Defaults match the
//! wire contract shared by the gateway, the workers and the drain.

use core_config::{env_or_default, env_parse, ConfigError, FromEnv};

/// Work queue name.
pub const DEFAULT_QUEUE: &str = "jobs";
/// Dead-letter exchange (direct).
pub const DEFAULT_DEAD_LETTER_EXCHANGE: &str = "jobs.dlx";
/// Dead-letter queue.
pub const DEFAULT_DEAD_LETTER_QUEUE: &str = "jobs.dlq";
/// Routing key binding the dead-letter queue to its exchange.
pub const DEFAULT_DEAD_LETTER_ROUTING_KEY: &str = "jobs.dlq";
/// Total deliveries a job gets before it is dead-lettered.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Unacknowledged messages a worker may hold at once.
pub const PREFETCH_COUNT: u16 = 1;

/// Configuration shared by the publisher, the worker and the drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub queue: String,
    pub dead_letter_exchange: String,
    pub dead_letter_queue: String,
    pub dead_letter_routing_key: String,
    pub max_attempts: u32,
}

impl QueueConfig {
    /// Set the work queue name
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Set the retry limit (clamped to at least one attempt)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue: DEFAULT_QUEUE.to_string(),
            dead_letter_exchange: DEFAULT_DEAD_LETTER_EXCHANGE.to_string(),
            dead_letter_queue: DEFAULT_DEAD_LETTER_QUEUE.to_string(),
            dead_letter_routing_key: DEFAULT_DEAD_LETTER_ROUTING_KEY.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl FromEnv for QueueConfig {
    /// Reads JOB_QUEUE, JOB_DLX, JOB_DLQ, JOB_DLQ_ROUTING_KEY and JOB_MAX_ATTEMPTS.
    fn from_env() -> Result<Self, ConfigError> {
        let max_attempts = env_parse("JOB_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "JOB_MAX_ATTEMPTS".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            queue: env_or_default("JOB_QUEUE", DEFAULT_QUEUE),
            dead_letter_exchange: env_or_default("JOB_DLX", DEFAULT_DEAD_LETTER_EXCHANGE),
            dead_letter_queue: env_or_default("JOB_DLQ", DEFAULT_DEAD_LETTER_QUEUE),
            dead_letter_routing_key: env_or_default(
                "JOB_DLQ_ROUTING_KEY",
                DEFAULT_DEAD_LETTER_ROUTING_KEY,
            ),
            max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 5] = [
        "JOB_QUEUE",
        "JOB_DLX",
        "JOB_DLQ",
        "JOB_DLQ_ROUTING_KEY",
        "JOB_MAX_ATTEMPTS",
    ];

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = QueueConfig::from_env().unwrap();
            assert_eq!(config, QueueConfig::default());
            assert_eq!(config.queue, "jobs");
            assert_eq!(config.dead_letter_exchange, "jobs.dlx");
            assert_eq!(config.dead_letter_queue, "jobs.dlq");
            assert_eq!(config.dead_letter_routing_key, "jobs.dlq");
            assert_eq!(config.max_attempts, 3);
        });
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("JOB_QUEUE", Some("reports")),
                ("JOB_DLX", Some("reports.dlx")),
                ("JOB_MAX_ATTEMPTS", Some("5")),
            ],
            || {
                let config = QueueConfig::from_env().unwrap();
                assert_eq!(config.queue, "reports");
                assert_eq!(config.dead_letter_exchange, "reports.dlx");
                assert_eq!(config.max_attempts, 5);
            },
        );
    }

    #[test]
    fn test_zero_attempts_rejected() {
        temp_env::with_var("JOB_MAX_ATTEMPTS", Some("0"), || {
            let err = QueueConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JOB_MAX_ATTEMPTS"));
        });
    }

    #[test]
    fn test_builder_clamps_attempts() {
        let config = QueueConfig::default().with_queue("q").with_max_attempts(0);
        assert_eq!(config.queue, "q");
        assert_eq!(config.max_attempts, 1);
    }
}
