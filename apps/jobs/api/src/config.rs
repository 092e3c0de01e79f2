use std::time::Duration;

use core_config::{env_parse, AmqpConfig, Environment, FromEnv, GrpcServerConfig, ServerConfig};
use domain_workers::{DEFAULT_SWEEP_INTERVAL, DEFAULT_WORKER_TTL_SECS};
use eyre::WrapErr;
use job_queue::QueueConfig;

/// Gateway configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub amqp: AmqpConfig,
    pub queue: QueueConfig,
    pub http: ServerConfig,
    pub grpc: GrpcServerConfig,
    pub worker_ttl: chrono::Duration,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let worker_ttl_secs: i64 = env_parse("WORKER_TTL_SECS", DEFAULT_WORKER_TTL_SECS)?;
        let sweep_secs: u64 =
            env_parse("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL.as_secs())?;
        if worker_ttl_secs <= 0 || sweep_secs == 0 {
            eyre::bail!("WORKER_TTL_SECS and SWEEP_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            environment: Environment::from_env(),
            amqp: AmqpConfig::from_env().wrap_err("Failed to load AMQP configuration")?,
            queue: QueueConfig::from_env().wrap_err("Failed to load queue configuration")?,
            http: ServerConfig::from_env()?, // HOST=0.0.0.0, PORT=8080
            grpc: GrpcServerConfig::from_env()?, // GRPC_HOST=0.0.0.0, GRPC_PORT=50051
            worker_ttl: chrono::Duration::seconds(worker_ttl_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}
