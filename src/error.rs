//! Error types for the geo gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::geo::ValidationError;
use crate::models::ErrorResponse;

/// Message returned to clients for internal failures. The real cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// == Gateway Error Enum ==
/// Unified error type for the gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Malformed or out-of-range input. Never reaches the cache or backend.
    #[error("{0}")]
    Validation(ValidationError),

    /// Backend unreachable, timed out, or returned an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Unexpected failure in cache bookkeeping or aggregation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        GatewayError::Validation(err)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_details(err.message(), err.violations),
            ),
            GatewayError::Backend(msg) => (StatusCode::BAD_GATEWAY, ErrorResponse::new(msg)),
            GatewayError::Internal(msg) => {
                error!("Internal gateway failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(INTERNAL_ERROR_MESSAGE),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Violation;

    #[test]
    fn test_status_codes() {
        let validation = GatewayError::Validation(ValidationError::new(vec![Violation::body(
            "points",
            "missing",
        )]));
        assert_eq!(
            validation.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Backend("down".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Internal("oops".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response = GatewayError::Internal("lru desync on key abc".into()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains(INTERNAL_ERROR_MESSAGE));
        assert!(!body.contains("lru desync"));
    }
}
