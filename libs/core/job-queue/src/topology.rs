//! Broker topology
//!
//! ```text
//!  publish ──► [jobs] ──reject(requeue=false)──► (jobs.dlx, direct) ──jobs.dlq──► [jobs.dlq]
//! ```
//!
//! Dead-lettering is done by the broker itself: the work queue is declared with
//! `x-dead-letter-exchange` / `x-dead-letter-routing-key`, so any delivery a
//! worker rejects without requeue lands in the dead-letter queue. All declares
//! are idempotent and safe to repeat against an already configured broker as
//! long as the arguments match.

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind};
use tracing::{debug, info};

use crate::config::QueueConfig;
use crate::error::QueueError;

pub const DEAD_LETTER_EXCHANGE_ARG: &str = "x-dead-letter-exchange";
pub const DEAD_LETTER_ROUTING_KEY_ARG: &str = "x-dead-letter-routing-key";

/// Declares the work queue, dead-letter exchange and dead-letter queue.
#[derive(Debug, Clone)]
pub struct Topology {
    config: QueueConfig,
}

impl Topology {
    pub fn new(config: QueueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Arguments that route rejected work-queue messages to the dead-letter exchange.
    pub fn work_queue_arguments(&self) -> FieldTable {
        let mut args = FieldTable::default();
        args.insert(
            DEAD_LETTER_EXCHANGE_ARG.into(),
            AMQPValue::LongString(self.config.dead_letter_exchange.as_str().into()),
        );
        args.insert(
            DEAD_LETTER_ROUTING_KEY_ARG.into(),
            AMQPValue::LongString(self.config.dead_letter_routing_key.as_str().into()),
        );
        args
    }

    fn durable() -> QueueDeclareOptions {
        QueueDeclareOptions {
            durable: true,
            ..QueueDeclareOptions::default()
        }
    }

    /// Declare everything. Any failure aborts; a partial topology is unusable.
    pub async fn declare(&self, channel: &Channel) -> Result<(), QueueError> {
        let cfg = &self.config;

        channel
            .exchange_declare(
                &cfg.dead_letter_exchange,
                ExchangeKind::Direct,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        debug!(exchange = %cfg.dead_letter_exchange, "Declared dead-letter exchange");

        channel
            .queue_declare(&cfg.dead_letter_queue, Self::durable(), FieldTable::default())
            .await?;
        channel
            .queue_bind(
                &cfg.dead_letter_queue,
                &cfg.dead_letter_exchange,
                &cfg.dead_letter_routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
        debug!(
            queue = %cfg.dead_letter_queue,
            routing_key = %cfg.dead_letter_routing_key,
            "Declared and bound dead-letter queue"
        );

        channel
            .queue_declare(&cfg.queue, Self::durable(), self.work_queue_arguments())
            .await?;

        info!(
            queue = %cfg.queue,
            dead_letter_exchange = %cfg.dead_letter_exchange,
            dead_letter_queue = %cfg.dead_letter_queue,
            "Broker topology ready"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lapin::types::ShortString;

    fn arg(args: &FieldTable, key: &str) -> Option<AMQPValue> {
        args.inner().get(&ShortString::from(key)).cloned()
    }

    #[test]
    fn test_work_queue_routes_to_dead_letter_exchange() {
        let topology = Topology::new(QueueConfig::default());
        let args = topology.work_queue_arguments();

        assert_eq!(
            arg(&args, DEAD_LETTER_EXCHANGE_ARG),
            Some(AMQPValue::LongString("jobs.dlx".into()))
        );
        assert_eq!(
            arg(&args, DEAD_LETTER_ROUTING_KEY_ARG),
            Some(AMQPValue::LongString("jobs.dlq".into()))
        );
        assert_eq!(args.inner().len(), 2);
    }

    #[test]
    fn test_arguments_follow_config() {
        let config = QueueConfig {
            dead_letter_exchange: "billing.dlx".to_string(),
            dead_letter_routing_key: "billing.dead".to_string(),
            ..QueueConfig::default()
        };
        let args = Topology::new(config).work_queue_arguments();

        assert_eq!(
            arg(&args, DEAD_LETTER_EXCHANGE_ARG),
            Some(AMQPValue::LongString("billing.dlx".into()))
        );
        assert_eq!(
            arg(&args, DEAD_LETTER_ROUTING_KEY_ARG),
            Some(AMQPValue::LongString("billing.dead".into()))
        );
    }

    #[test]
    fn test_queues_are_durable() {
        assert!(Topology::durable().durable);
        assert!(!Topology::durable().exclusive);
        assert!(!Topology::durable().auto_delete);
    }
}
