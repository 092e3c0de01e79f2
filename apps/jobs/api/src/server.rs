//! Process startup and lifecycle
//!
//! Runs two servers and one background task until SIGINT/SIGTERM:
//! - HTTP gateway (`POST /jobs`, `/health`, `/metrics`)
//! - gRPC `worker.v1.WorkerService` plus `grpc.health.v1.Health`
//! - the registry expiry sweeper

use std::sync::Arc;

use core_config::tracing::{init_tracing, install_color_eyre};
use domain_workers::{Registry, spawn_sweeper};
use eyre::{Result, WrapErr};
use job_queue::{AmqpPublisher, Topology, connect, shutdown};
use rpc::worker::v1::worker_service_server::{SERVICE_NAME, WorkerServiceServer};
use tokio::net::TcpListener;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::routes::{AppState, router};
use crate::worker_service::WorkerServiceImpl;

/// Run the gateway.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the broker is unreachable,
/// the topology cannot be declared or either server fails to bind.
pub async fn run() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    job_queue::init_metrics();

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        "Starting jobs API"
    );

    let connection = connect(&config.amqp, env!("CARGO_PKG_NAME"))
        .await
        .wrap_err("Failed to connect to broker")?;
    let channel = connection
        .create_channel()
        .await
        .wrap_err("Failed to open broker channel")?;
    Topology::new(config.queue.clone())
        .declare(&channel)
        .await
        .wrap_err("Failed to declare broker topology")?;

    let publisher = AmqpPublisher::new(&connection, &config.queue.queue)
        .await
        .wrap_err("Failed to open publisher channel")?;

    let (shutdown_tx, shutdown_rx) = shutdown::spawn_signal_listener();

    let registry = Arc::new(Registry::new().with_ttl(config.worker_ttl));
    let sweeper = spawn_sweeper(registry.clone(), config.sweep_interval, shutdown_rx.clone());

    // HTTP gateway
    let app = router(AppState::new(Arc::new(publisher))).layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind(config.http.address())
        .await
        .wrap_err_with(|| format!("Failed to bind HTTP server to {}", config.http.address()))?;
    info!(address = %config.http.address(), "HTTP gateway listening");

    let http = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for(shutdown_rx.clone()));

    // gRPC liveness service
    let grpc_addr = config.grpc.socket_addr()?;
    let (health, health_service) = health_reporter();
    health
        .set_service_status(SERVICE_NAME, tonic_health::ServingStatus::Serving)
        .await;
    health
        .set_service_status("", tonic_health::ServingStatus::Serving)
        .await;
    info!(address = %grpc_addr, "WorkerService listening");

    let grpc = Server::builder()
        .add_service(health_service)
        .add_service(
            WorkerServiceServer::new(WorkerServiceImpl::new(registry))
                .accept_compressed(tonic::codec::CompressionEncoding::Zstd)
                .send_compressed(tonic::codec::CompressionEncoding::Zstd),
        )
        .serve_with_shutdown(grpc_addr, shutdown::wait_for(shutdown_rx));

    let result = tokio::try_join!(
        async { http.await.wrap_err("HTTP server failed") },
        async { grpc.await.wrap_err("gRPC server failed") },
    );

    // Stop everything else if one server failed on its own.
    let _ = shutdown_tx.send(true);
    let _ = sweeper.await;
    let _ = connection.close(0, "shutdown").await;

    result?;
    info!("Jobs API stopped");
    Ok(())
}
