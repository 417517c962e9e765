//! Error types for the dashboard API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spawnboard_core::StoreError;

/// Errors that can occur in the dashboard API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource is not in the catalog.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed (bad key, time or timestamp).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The timer store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Store(StoreError::InvalidKey(key)) => {
                (StatusCode::BAD_REQUEST, format!("invalid resource key: {key}"))
            }
            Self::Store(e @ StoreError::Backend(_)) => {
                tracing::error!(error = %e, "Timer store failure");
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
