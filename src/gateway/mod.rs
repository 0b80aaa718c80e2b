//! Gateway Orchestrator
//!
//! Runs one request through validation, cache lookup, computation, and
//! cache store:
//!
//! ```text
//! Received -> Validating -> CacheHit -> Done
//!                        -> CacheMiss -> Computing -> CacheStore -> Done
//!                        -> Failed            (validation)
//!                                     Computing -> Failed (backend/engine)
//! ```

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::backend::{ComputeBackend, HttpBackend, LocalBackend};
use crate::cache::{self, CacheStats, ResponseCache, SharedCache};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::geo::{self, CacheKey, GeoResult, PointSet};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Computed,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "HIT",
            Source::Computed => "MISS",
        }
    }
}

/// A successfully processed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Processed {
    pub result: GeoResult,
    pub source: Source,
}

/// Composes validator, cache, and backend into the request cycle.
///
/// Cheap to clone; clones share the same cache and backend.
#[derive(Clone)]
pub struct Gateway {
    cache: SharedCache,
    backend: Arc<dyn ComputeBackend>,
}

impl Gateway {
    pub fn new(cache: SharedCache, backend: Arc<dyn ComputeBackend>) -> Self {
        Self { cache, backend }
    }

    /// Builds the cache and picks the backend from configuration.
    ///
    /// A configured `backend_url` selects the HTTP proxy, otherwise results
    /// are computed in-process.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = cache::shared(ResponseCache::new(
            config.cache_max_entries,
            config.cache_ttl(),
        ));

        let backend: Arc<dyn ComputeBackend> = match &config.backend_url {
            Some(url) => {
                info!("Using remote computation backend at {}", url);
                Arc::new(HttpBackend::new(url, config.backend_timeout())?)
            }
            None => {
                info!("No BACKEND_URL configured, aggregating locally");
                Arc::new(LocalBackend)
            }
        };

        Ok(Self::new(cache, backend))
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // == Process ==
    /// Validates a decoded request body and resolves it.
    pub async fn process(&self, raw: &Value) -> Result<GeoResult> {
        let points = geo::validate_request(raw)?;
        Ok(self.resolve(points).await?.result)
    }

    /// Same as [`Gateway::process`] for an undecoded body.
    pub async fn process_bytes(&self, body: &[u8]) -> Result<Processed> {
        let points = geo::parse_body(body).map_err(|e| {
            debug!(violations = e.violations.len(), "request failed validation");
            GatewayError::from(e)
        })?;
        self.resolve(points).await
    }

    // == Resolve ==
    /// Answers a validated point set from cache, or computes and stores it.
    pub async fn resolve(&self, points: PointSet) -> Result<Processed> {
        let key = CacheKey::for_points(&points);

        // Write lock: a hit updates recency.
        let cached = self.cache.write().await.get(&key);
        if let Some(result) = cached {
            debug!(key = %key, "cache hit");
            return Ok(Processed {
                result,
                source: Source::Cache,
            });
        }

        debug!(key = %key, backend = self.backend.name(), points = points.len(), "cache miss, computing");
        let result = self.backend.compute(&points).await.map_err(|e| {
            warn!(error = %e, backend = self.backend.name(), "computation failed");
            e
        })?;

        self.cache.write().await.put(key, result)?;

        Ok(Processed {
            result,
            source: Source::Computed,
        })
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
