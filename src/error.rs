//! Error types for the data cache
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
/// Service-facing error type.
///
/// Persistence problems never show up here; the cache store absorbs them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (absent or expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Path names a cache domain that is not registered
    #[error("Unknown cache domain: {0}")]
    UnknownDomain(String),

    /// Producer failed and no cached fallback existed
    #[error("Upstream error: {0}")]
    Upstream(#[from] FetchError),

    /// No upstream is configured for read-through fetches
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::UnknownDomain(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service layer.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Storage Error Enum ==
/// Failures of the key-value storage behind the persistent mirror.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Mirror serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Fetch Error Enum ==
/// Failures of an upstream producer.
///
/// `Clone` so that every caller joined on a deduplicated request can receive
/// the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode upstream payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Request(err.to_string())
        }
    }
}
