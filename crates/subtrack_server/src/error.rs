//! HTTP error mapping and startup failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use subtrack_core::{DbError, ServiceError};
use thiserror::Error;

use crate::config::ConfigError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure of a request handler.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// Query string did not match the endpoint's parameters.
    #[error("invalid query parameters: {0}")]
    InvalidQuery(String),
    /// The blocking store task panicked or was cancelled.
    #[error("request worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::Validation(_)) | Self::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Service(ServiceError::NotFound) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Storage(_)) | Self::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Fatal error raised before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to initialize logging: {0}")]
    Logging(String),
    #[error("failed to open database: {0}")]
    Store(#[from] DbError),
    #[error("server I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
