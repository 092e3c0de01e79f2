use std::time::Duration;

use core_config::{env_or_default, env_parse, AmqpConfig, Environment, FromEnv};
use eyre::WrapErr;
use job_queue::QueueConfig;
use uuid::Uuid;

pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:50051";
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub amqp: AmqpConfig,
    pub queue: QueueConfig,
    pub registry_url: String,
    /// Stable for the life of the process
    pub worker_id: String,
    pub heartbeat_interval: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let heartbeat_secs = env_parse("HEARTBEAT_INTERVAL_SECS", DEFAULT_HEARTBEAT_INTERVAL_SECS)?;
        if heartbeat_secs == 0 {
            eyre::bail!("HEARTBEAT_INTERVAL_SECS must be positive");
        }

        let worker_id = std::env::var("WORKER_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("worker-{}", Uuid::new_v4()));

        Ok(Self {
            environment: Environment::from_env(),
            amqp: AmqpConfig::from_env().wrap_err("Failed to load AMQP configuration")?,
            queue: QueueConfig::from_env().wrap_err("Failed to load queue configuration")?,
            registry_url: env_or_default("REGISTRY_URL", DEFAULT_REGISTRY_URL),
            worker_id,
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
        })
    }
}
