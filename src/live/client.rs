//! HTTP client for a running gateway's `POST /geo/process`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::GeoSubmitter;
use crate::error::{GatewayError, Result};
use crate::geo::{GeoResult, PointSet, ValidationError};
use crate::models::{ErrorResponse, ProcessRequest};

const FALLBACK_MESSAGE: &str = "Error processing points";

#[derive(Debug, Clone)]
pub struct HttpGatewayClient {
    client: Client,
    base_url: String,
}

impl HttpGatewayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/geo/process", self.base_url)
    }
}

#[async_trait]
impl GeoSubmitter for HttpGatewayClient {
    async fn submit(&self, points: PointSet) -> Result<GeoResult> {
        debug!(points = points.len(), "submitting points to gateway");

        let response = self
            .client
            .post(self.url())
            .json(&ProcessRequest { points: &points })
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "gateway request failed");
                GatewayError::Backend("Gateway is unreachable".into())
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<GeoResult>()
                .await
                .map_err(|_| GatewayError::Backend("Gateway returned a malformed response".into()));
        }

        let error = response.json::<ErrorResponse>().await.ok();
        Err(map_error_response(status, error))
    }
}

fn map_error_response(status: StatusCode, error: Option<ErrorResponse>) -> GatewayError {
    match (status, error) {
        (StatusCode::BAD_REQUEST, Some(ErrorResponse {
            details: Some(details),
            ..
        })) => GatewayError::Validation(ValidationError::new(details)),
        (s, error) => {
            let message = error
                .map(|e| e.message)
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
            if s == StatusCode::INTERNAL_SERVER_ERROR {
                GatewayError::Internal(message)
            } else {
                GatewayError::Backend(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Violation;

    #[test]
    fn test_maps_validation_details() {
        let err = map_error_response(
            StatusCode::BAD_REQUEST,
            Some(ErrorResponse::with_details(
                "bad",
                vec![Violation::point(0, "lat", "must be between -90 and 90")],
            )),
        );
        match err {
            GatewayError::Validation(v) => assert_eq!(v.invalid_indices(), vec![0]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_maps_backend_message() {
        let err = map_error_response(
            StatusCode::BAD_GATEWAY,
            Some(ErrorResponse::new("Backend computation service is unreachable")),
        );
        assert_eq!(
            err,
            GatewayError::Backend("Backend computation service is unreachable".into())
        );
    }

    #[test]
    fn test_falls_back_without_body() {
        let err = map_error_response(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err, GatewayError::Internal(FALLBACK_MESSAGE.into()));
    }
}
