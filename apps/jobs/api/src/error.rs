use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use job_queue::QueueError;
use serde::Serialize;
use thiserror::Error;

/// Error body returned by the gateway.
///
/// ```json
/// { "error": "BAD_REQUEST", "message": "missing field `type`" }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid job submission: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Failed to enqueue job: {0}")]
    Enqueue(#[from] QueueError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ApiError::InvalidBody(rejection) => {
                tracing::debug!(error = %rejection, "Rejected job submission");
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text())
            }
            ApiError::Enqueue(e) => {
                tracing::error!(error = %e, "Failed to enqueue job");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "failed to enqueue job".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
