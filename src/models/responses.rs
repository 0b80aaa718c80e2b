//! Response DTOs
//!
//! Defines the structure of outgoing HTTP response bodies. Successful
//! processing returns [`GeoResult`](crate::geo::GeoResult) directly.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::geo::Violation;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
    /// Current number of cached results
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// "http" when a remote backend is configured, else "local"
    pub backend: String,
}

impl HealthResponse {
    pub fn healthy(backend: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            backend: backend.to_string(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description of what went wrong
    pub message: String,
    /// Per-field validation problems, when there are any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Violation>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(message: impl Into<String>, details: Vec<Violation>) -> Self {
        Self {
            message: message.into(),
            details: Some(details),
        }
    }
}
