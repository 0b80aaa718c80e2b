//! Backend Proxy
//!
//! Forwards point sets to a remote computation service and maps its
//! failures onto [`GatewayError::Backend`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::ComputeBackend;
use crate::error::{GatewayError, Result};
use crate::geo::{GeoResult, PointSet};
use crate::models::ProcessRequest;

/// Returned when the backend fails without a usable diagnostic.
pub const GENERIC_BACKEND_MESSAGE: &str = "Backend computation service failed";

const PROCESS_PATH: &str = "/process";

/// HTTP client for the remote computation backend.
///
/// One attempt per call, bounded by `timeout`; failures are never retried.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url, timeout))
    }

    pub fn with_client(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, PROCESS_PATH)
    }

    fn timed_out(&self) -> GatewayError {
        GatewayError::Backend(format!(
            "Backend computation service timed out after {} ms",
            self.timeout.as_millis()
        ))
    }

    async fn exchange(&self, points: &PointSet) -> Result<GeoResult> {
        let response = self
            .client
            .post(self.url())
            .json(&ProcessRequest { points })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = std::str::from_utf8(&body)
                .ok()
                .and_then(extract_backend_message)
                .unwrap_or_else(|| GENERIC_BACKEND_MESSAGE.to_string());
            warn!(%status, %message, "backend returned an error status");
            return Err(GatewayError::Backend(message));
        }

        serde_json::from_slice::<GeoResult>(&body).map_err(|e| {
            warn!(error = %e, "backend returned a malformed body");
            GatewayError::Backend("Backend computation service returned a malformed response".into())
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            warn!(error = %e, "backend request timed out");
            return self.timed_out();
        }
        warn!(error = %e, "backend request failed");
        GatewayError::Backend("Backend computation service is unreachable".into())
    }
}

#[async_trait]
impl ComputeBackend for HttpBackend {
    async fn compute(&self, points: &PointSet) -> Result<GeoResult> {
        debug!(url = %self.url(), points = points.len(), "forwarding to backend");

        // Dropping the exchange on timeout cancels the in-flight request.
        match tokio::time::timeout(self.timeout, self.exchange(points)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "backend call exceeded timeout"
                );
                Err(self.timed_out())
            }
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// == Error Detail Extraction ==
/// Pulls a human-readable diagnostic out of a backend error body.
///
/// Looks at `message`, then `detail`, then `error`. Each may be a string,
/// an array of strings, or an array of objects carrying `msg`.
pub fn extract_backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(flatten_detail))
}

fn flatten_detail(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(obj) => obj.get("msg").and_then(Value::as_str),
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(3)).unwrap();
        assert_eq!(backend.url(), "http://localhost:8000/process");
    }

    #[test]
    fn test_extract_message_string_fields() {
        assert_eq!(
            extract_backend_message(r#"{"message":"bad points"}"#).as_deref(),
            Some("bad points")
        );
        assert_eq!(
            extract_backend_message(r#"{"detail":"not allowed"}"#).as_deref(),
            Some("not allowed")
        );
        assert_eq!(
            extract_backend_message(r#"{"error":"exploded","details":[]}"#).as_deref(),
            Some("exploded")
        );
    }

    #[test]
    fn test_extract_message_prefers_message_field() {
        let body = r#"{"statusCode":400,"message":"lat must not be greater than 90","error":"Bad Request"}"#;
        assert_eq!(
            extract_backend_message(body).as_deref(),
            Some("lat must not be greater than 90")
        );
    }

    #[test]
    fn test_extract_message_arrays() {
        let body = r#"{"message":["points must be an array","points should not be empty"]}"#;
        assert_eq!(
            extract_backend_message(body).as_deref(),
            Some("points must be an array; points should not be empty")
        );

        let body = r#"{"detail":[{"loc":["body","points"],"msg":"field required"}]}"#;
        assert_eq!(extract_backend_message(body).as_deref(), Some("field required"));
    }

    #[test]
    fn test_extract_message_absent() {
        assert_eq!(extract_backend_message("<html>502</html>"), None);
        assert_eq!(extract_backend_message(r#"{"message":""}"#), None);
        assert_eq!(extract_backend_message(r#"{"status":"down"}"#), None);
    }
}
