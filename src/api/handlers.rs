//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue},
    Json,
};

use crate::config::Config;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::geo::GeoResult;
use crate::models::{HealthResponse, StatsResponse};

/// Response header telling whether the result came from cache.
pub static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Builds the gateway (cache plus backend) from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Gateway::from_config(config)?))
    }
}

/// Handler for POST /geo/process (and the backend-compatible POST /process)
///
/// Takes the raw body so malformed JSON is reported as a validation error
/// rather than an extractor rejection.
pub async fn process_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<([(HeaderName, HeaderValue); 1], Json<GeoResult>)> {
    let processed = state.gateway.process_bytes(&body).await?;
    let header = HeaderValue::from_static(processed.source.as_str());

    Ok(([(X_CACHE.clone(), header)], Json(processed.result)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.gateway.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.gateway.backend_name()))
}
