//! HTTP routes
//!
//! - `POST /jobs`: enqueue a job, `202 Accepted` with the full job record
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus text format

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use job_queue::{Job, JobPublisher};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<dyn JobPublisher>,
}

impl AppState {
    pub fn new(publisher: Arc<dyn JobPublisher>) -> Self {
        Self { publisher }
    }
}

/// Body of `POST /jobs`. Any `id` or `attempts` sent by the client is ignored.
#[derive(Debug, Deserialize)]
pub struct SubmitJob {
    #[serde(rename = "type")]
    pub job_type: String,

    #[serde(default)]
    pub payload: Value,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn submit_job(
    State(state): State<AppState>,
    body: Result<Json<SubmitJob>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = body?;
    let job = Job::new(submission.job_type, submission.payload);

    state.publisher.publish(&job).await?;

    info!(job_id = %job.id, job_type = %job.job_type, "Job enqueued");
    Ok((StatusCode::ACCEPTED, Json(job)))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn metrics() -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        job_queue::render_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use job_queue::QueueError;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<Job>>,
    }

    #[async_trait]
    impl JobPublisher for RecordingPublisher {
        async fn publish(&self, job: &Job) -> Result<(), QueueError> {
            self.published.lock().unwrap().push(job.clone());
            Ok(())
        }
    }

    struct DownPublisher;

    #[async_trait]
    impl JobPublisher for DownPublisher {
        async fn publish(&self, job: &Job) -> Result<(), QueueError> {
            Err(QueueError::PublishNacked {
                job_id: job.id.clone(),
            })
        }
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_jobs(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/jobs")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_202_with_fresh_job() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = router(AppState::new(publisher.clone()));

        let response = app
            .oneshot(post_jobs(
                r#"{"type":"email","payload":{"to":"a@b.c"},"attempts":5,"id":"mine"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["type"], "email");
        assert_eq!(body["payload"], json!({"to": "a@b.c"}));
        assert_eq!(body["attempts"], 0);
        assert_ne!(body["id"], "mine");

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, body["id"].as_str().unwrap());
        assert_eq!(published[0].attempts, 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let publisher = Arc::new(RecordingPublisher::default());
        let app = router(AppState::new(publisher.clone()));

        let response = app.oneshot(post_jobs("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["error"], "BAD_REQUEST");
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_type_is_400() {
        let app = router(AppState::new(Arc::new(RecordingPublisher::default())));
        let response = app.oneshot(post_jobs(r#"{"payload":1}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_publish_failure_is_500() {
        let app = router(AppState::new(Arc::new(DownPublisher)));

        let response = app.oneshot(post_jobs(r#"{"type":"email"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["error"], "INTERNAL_SERVER_ERROR");
    }

    #[tokio::test]
    async fn test_get_jobs_is_405() {
        let app = router(AppState::new(Arc::new(RecordingPublisher::default())));
        let request = Request::builder().uri("/jobs").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(AppState::new(Arc::new(RecordingPublisher::default())));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response.into_body()).await["status"], "ok");
    }
}
