//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for every cache backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Stored value has a different type than the one requested
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Decrement of an unsigned counter already at zero
    #[error("Counter underflow: {0} is already zero")]
    Underflow(String),

    /// Counter step left the range of the stored integer type
    #[error("Counter overflow: {key} does not fit in {kind}")]
    Overflow { key: String, kind: String },

    /// Encoded object exceeds the per-object ceiling
    #[error("Object too large: {size} bytes exceeds limit of {limit} bytes")]
    ObjectTooLarge { size: usize, limit: usize },

    /// Malformed bytes or a value the codec cannot represent
    #[error("Codec error: {0}")]
    Codec(String),

    /// Missing/unknown adapter, duplicate registration or bad settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by a remote store
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) | CacheError::Expired(_) => StatusCode::NOT_FOUND,
            CacheError::TypeMismatch { .. }
            | CacheError::Underflow(_)
            | CacheError::Overflow { .. } => StatusCode::CONFLICT,
            CacheError::ObjectTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Codec(_) | CacheError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
