//! Hub error types with HTTP status code mapping.
//!
//! [`HubError`] is the central error type for the hub. Each variant maps to
//! a specific HTTP status code and structured JSON error response. The two
//! "duplicate" outcomes (re-inserted quake, re-recorded alert) are not
//! errors; they surface as counts and booleans from the store.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "storage error: database is locked",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`HubError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Upstream Feed   | 502 Bad Gateway            |
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// A bounding box string could not be parsed or normalized.
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Rule with the given id was not found.
    #[error("rule not found: {0}")]
    RuleNotFound(i64),

    /// Upstream feed request failed (transport error or non-2xx status).
    #[error("feed fetch failed: {0}")]
    FetchFailed(String),

    /// Upstream feed responded but the body was not a decodable feature
    /// collection.
    #[error("feed decode failed: {0}")]
    FeedDecode(String),

    /// Storage layer failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidBoundingBox(_) => 1001,
            Self::RuleNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
            Self::FetchFailed(_) => 4001,
            Self::FeedDecode(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBoundingBox(_) => StatusCode::BAD_REQUEST,
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FetchFailed(_) | Self::FeedDecode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_by_category() {
        assert_eq!(
            HubError::InvalidBoundingBox("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HubError::RuleNotFound(7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HubError::Storage("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HubError::FetchFailed("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            HubError::InvalidBoundingBox("x".to_string()).error_code(),
            1001
        );
        assert_eq!(HubError::RuleNotFound(1).error_code(), 2001);
        assert_eq!(HubError::FeedDecode("x".to_string()).error_code(), 4002);
    }

    #[test]
    fn display_includes_context() {
        let err = HubError::RuleNotFound(42);
        assert_eq!(err.to_string(), "rule not found: 42");
    }
}
