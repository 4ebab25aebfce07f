//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request shape
    BadRequest(String),
    /// Engine error (validation, configuration, repository)
    Engine(EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Engine(e) => match e {
                EngineError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new("VALIDATION_ERROR", msg),
                ),
                EngineError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                }
                EngineError::Configuration(msg) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("CONFIGURATION_ERROR", msg),
                ),
                EngineError::Repository(e) => {
                    if e.is_not_found() {
                        (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ApiError::new("REPOSITORY_ERROR", e.to_string()),
                        )
                    }
                }
            },
        };

        (status, Json(error)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}
