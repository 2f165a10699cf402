//! Error types for the cache gateway
//!
//! Provides unified error handling using thiserror. The cache stores
//! themselves are infallible; errors only arise from request validation and
//! from the remote brokerage.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Remote Error ==
/// Failure of a call to the remote brokerage. Never cached.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The call did not finish within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Non-2xx HTTP status
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The brokerage answered with a non-ok envelope
    #[error("upstream rejected request: {0}")]
    Rejected(String),

    /// The payload could not be decoded or normalized
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Http(err)
        }
    }
}

impl RemoteError {
    /// True when the brokerage refused the credentials (HTTP 401 or 403).
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Status { status: 401 | 403, .. })
    }
}

// == Service Error ==
/// Errors surfaced by the fetch-through and write paths.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Caller supplied an unusable request; raised before any cache or network use
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The brokerage has no record of the requested item
    #[error("Not found: {0}")]
    NotFound(String),

    /// No active session; raised before any cache or network use
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The remote fetch or write failed
    #[error("Remote fetch failed: {0}")]
    Remote(#[from] RemoteError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Remote(err) if err.is_auth_failure() => StatusCode::UNAUTHORIZED,
            ServiceError::Remote(RemoteError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ServiceError::Remote(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service layer.
pub type Result<T> = std::result::Result<T, ServiceError>;
