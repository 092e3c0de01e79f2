//! Process shutdown signalling
//!
//! One `watch` channel per process. Every long-running loop (consumer,
//! heartbeat, sweeper, servers) holds a receiver and exits when it flips to
//! `true`.

use std::io;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Wait for SIGINT or SIGTERM.
pub async fn shutdown_signal() -> io::Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = ctrl_c => {
                result?;
                info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}

/// Spawn a task that flips the returned channel to `true` on SIGINT/SIGTERM.
///
/// The sender is returned too so the process can trigger shutdown itself,
/// for example when a fatal error ends one of its loops.
pub fn spawn_signal_listener() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    let signal_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        let _ = signal_tx.send(true);
    });

    (tx, rx)
}

/// Resolve once `shutdown` flips to `true` or its sender is gone.
pub async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
