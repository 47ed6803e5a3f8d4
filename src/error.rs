//! Error types for the storage layer and the HTTP API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Storage layer failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Request handler failures. Every variant converts to a JSON body with
/// an `error` field; handler boundaries never panic the process.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected input, surfaced as 400
    #[error("{0}")]
    Validation(String),

    /// Missing post/profile, surfaced as 404
    #[error("{0}")]
    NotFound(String),

    /// Unparseable request body, surfaced as 400
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Storage failure, surfaced as 500 (404 for a missing row)
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::Storage(StorageError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
