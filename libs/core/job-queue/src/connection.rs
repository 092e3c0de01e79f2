//! Broker connection and consumer setup

use core_config::AmqpConfig;
use lapin::options::{BasicConsumeOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer};
use tracing::info;

use crate::error::QueueError;

/// Open a connection to the broker.
pub async fn connect(config: &AmqpConfig, connection_name: &str) -> Result<Connection, QueueError> {
    let properties = ConnectionProperties::default().with_connection_name(connection_name.into());
    let connection = Connection::connect(&config.url, properties).await?;

    info!(
        url = %config.redacted_url(),
        connection_name = %connection_name,
        "Connected to broker"
    );
    Ok(connection)
}

/// Start consuming `queue` on `channel` with manual acknowledgements.
///
/// With `prefetch` set, the broker holds back further deliveries until the
/// outstanding ones are acknowledged or rejected.
pub async fn open_consumer(
    channel: &Channel,
    queue: &str,
    consumer_tag: &str,
    prefetch: Option<u16>,
) -> Result<Consumer, QueueError> {
    if let Some(count) = prefetch {
        channel.basic_qos(count, BasicQosOptions::default()).await?;
    }

    let consumer = channel
        .basic_consume(
            queue,
            consumer_tag,
            BasicConsumeOptions {
                no_ack: false,
                ..BasicConsumeOptions::default()
            },
            FieldTable::default(),
        )
        .await?;

    info!(queue = %queue, consumer_tag = %consumer_tag, prefetch = ?prefetch, "Consumer started");
    Ok(consumer)
}
