//! gRPC liveness service over the worker registry

use std::sync::Arc;

use domain_workers::Registry;
use rpc::worker::v1::{
    worker_service_server::WorkerService, HeartbeatRequest, HeartbeatResponse,
    ListWorkersRequest, ListWorkersResponse, RegisterRequest, RegisterResponse, WorkerInfo,
};
use tonic::{Request, Response, Status};
use tracing::debug;

pub const STATUS_OK: &str = "ok";
pub const STATUS_ALIVE: &str = "alive";

pub struct WorkerServiceImpl {
    registry: Arc<Registry>,
}

impl WorkerServiceImpl {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

fn to_proto(info: domain_workers::WorkerInfo) -> WorkerInfo {
    WorkerInfo {
        last_seen_unix: info.last_seen_unix(),
        worker_id: info.worker_id,
        load: info.load,
    }
}

#[tonic::async_trait]
impl WorkerService for WorkerServiceImpl {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();
        self.registry.register(&req.worker_id).await;

        Ok(Response::new(RegisterResponse {
            status: STATUS_OK.to_string(),
        }))
    }

    async fn heartbeat(
        &self,
        request: Request<HeartbeatRequest>,
    ) -> Result<Response<HeartbeatResponse>, Status> {
        let req = request.into_inner();
        let known = self.registry.update_load(&req.worker_id, req.load).await;
        debug!(worker_id = %req.worker_id, load = req.load, known, "Heartbeat");

        Ok(Response::new(HeartbeatResponse {
            status: STATUS_ALIVE.to_string(),
        }))
    }

    async fn list_workers(
        &self,
        _request: Request<ListWorkersRequest>,
    ) -> Result<Response<ListWorkersResponse>, Status> {
        let workers = self
            .registry
            .list()
            .await
            .into_iter()
            .map(to_proto)
            .collect();

        Ok(Response::new(ListWorkersResponse { workers }))
    }
}
