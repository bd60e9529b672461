//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is rendered to clients. Only validation and not-found messages are
//! echoed back; everything else is logged and replaced with a generic message.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use life_script_core::ports::PortError;
use serde_json::json;
use tracing::error;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying Redis client.
    #[error("Redis Error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Port(PortError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(PortError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Port(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message safe to show a client.
    fn public_message(&self) -> String {
        match self {
            ApiError::Port(PortError::Validation(message)) => message.clone(),
            ApiError::Port(PortError::NotFound(_)) => "Record not found".to_string(),
            ApiError::Port(PortError::Configuration(_)) | ApiError::Config(_) => {
                "Service is not configured".to_string()
            }
            ApiError::Port(PortError::Upstream(_)) => "AI service request failed".to_string(),
            ApiError::Port(PortError::Unexpected(_)) | ApiError::Redis(_) => {
                "Record store is unavailable".to_string()
            }
            ApiError::Io(_) | ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
