//! Registry client: registration and periodic heartbeats

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use eyre::{Result, WrapErr};
use rpc::worker::v1::{
    worker_service_client::WorkerServiceClient, HeartbeatRequest, RegisterRequest,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tonic::transport::Channel;
use tracing::{debug, info, warn};

pub type RegistryClient = WorkerServiceClient<Channel>;

pub async fn connect(url: &str) -> Result<RegistryClient> {
    let client = WorkerServiceClient::connect(url.to_string())
        .await
        .wrap_err_with(|| format!("Failed to connect to registry at {url}"))?;
    Ok(client)
}

/// Register this worker. Failure is fatal for the worker process.
pub async fn register(client: &mut RegistryClient, worker_id: &str) -> Result<()> {
    let response = client
        .register(RegisterRequest {
            worker_id: worker_id.to_string(),
        })
        .await
        .wrap_err("Failed to register worker")?;

    info!(worker_id = %worker_id, status = %response.into_inner().status, "Registered with registry");
    Ok(())
}

/// Clamp the in-flight counter to the wire type.
fn current_load(in_flight: &AtomicI64) -> i32 {
    let value = in_flight.load(Ordering::SeqCst);
    i32::try_from(value.max(0)).unwrap_or(i32::MAX)
}

/// Send a heartbeat every `interval` carrying the in-flight job count.
///
/// A failed heartbeat is logged and skipped; the next tick tries again.
pub fn spawn_heartbeat(
    mut client: RegistryClient,
    worker_id: String,
    in_flight: Arc<AtomicI64>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let load = current_load(&in_flight);
                    let request = HeartbeatRequest {
                        worker_id: worker_id.clone(),
                        load,
                    };
                    match client.heartbeat(request).await {
                        Ok(_) => debug!(worker_id = %worker_id, load, "Heartbeat sent"),
                        Err(status) => warn!(
                            worker_id = %worker_id,
                            code = ?status.code(),
                            error = %status.message(),
                            "Heartbeat failed"
                        ),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(worker_id = %worker_id, "Heartbeat stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_is_clamped() {
        assert_eq!(current_load(&AtomicI64::new(3)), 3);
        assert_eq!(current_load(&AtomicI64::new(-1)), 0);
        assert_eq!(current_load(&AtomicI64::new(i64::MAX)), i32::MAX);
    }
}
