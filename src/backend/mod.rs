//! Backend Module
//!
//! Computation backends the gateway delegates cache misses to.
//!
//! # Backends
//! - `HttpBackend`: forwards to a remote service over HTTP
//! - `LocalBackend`: runs the aggregation engine in-process

mod http;
mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::geo::{GeoResult, PointSet};

pub use http::{extract_backend_message, HttpBackend, GENERIC_BACKEND_MESSAGE};
pub use local::LocalBackend;

/// Produces a result for a validated point set.
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    async fn compute(&self, points: &PointSet) -> Result<GeoResult>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}
