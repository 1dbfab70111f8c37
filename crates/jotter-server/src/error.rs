//! API error mapping for the resource endpoints.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use jotter_auth::AuthError;
use jotter_storage::StorageError;

/// Errors surfaced by the resource handlers.
///
/// Auth errors keep their own response mapping; storage failures become
/// opaque 5xx bodies with the detail in the logs only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Authentication/authorization failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Request body failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not-found error for a resource.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::Storage(StorageError::not_found(resource.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => err.into_response(),
            Self::Storage(err) => storage_response(err),
            Self::Validation(message) => error_body(
                StatusCode::BAD_REQUEST,
                "validation_error",
                &message,
            ),
        }
    }
}

fn storage_response(err: StorageError) -> Response {
    match &err {
        StorageError::NotFound(message) => {
            error_body(StatusCode::NOT_FOUND, "not_found", message)
        }
        StorageError::Conflict(message) => {
            error_body(StatusCode::CONFLICT, "conflict", message)
        }
        StorageError::InvalidInput(message) => {
            error_body(StatusCode::BAD_REQUEST, "invalid_input", message)
        }
        StorageError::Database(_) | StorageError::Serialization(_) => {
            tracing::error!(error = %err, "Storage failure");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "Internal server error",
            )
        }
    }
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "error": {
            "code": code,
            "message": message,
        }
    });
    (status, Json(body)).into_response()
}
