//! API Error Types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent an unusable request
    #[error("{0}")]
    BadRequest(String),

    /// Runtime features do not match the trained schema
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Inference failed: {0}")]
    Inference(#[from] inference_engine::InferenceError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Startup failed: {0}")]
    Startup(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
