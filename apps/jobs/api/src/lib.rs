//! Jobs API
//!
//! Front door of the job queue and home of the worker registry.
//!
//! ## Architecture
//!
//! ```text
//! Client ──POST /jobs──► routes ──publish──► RabbitMQ [jobs]
//!
//! Worker ──Register/Heartbeat (gRPC)──► WorkerServiceImpl ──► Registry ◄── sweeper (5s)
//! ```
//!
//! ## Modules
//!
//! - `config`: environment configuration
//! - `routes`: HTTP submission gateway
//! - `worker_service`: gRPC liveness service (WorkerServiceImpl)
//! - `server`: startup and lifecycle

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod worker_service;

pub use server::run;
pub use worker_service::WorkerServiceImpl;
