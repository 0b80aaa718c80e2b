//! In-process backend backed by the aggregation engine.

use async_trait::async_trait;

use super::ComputeBackend;
use crate::error::{GatewayError, Result};
use crate::geo::{aggregate, GeoResult, PointSet};

/// Computes results locally; used when no remote backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

#[async_trait]
impl ComputeBackend for LocalBackend {
    async fn compute(&self, points: &PointSet) -> Result<GeoResult> {
        aggregate(points)
            .ok_or_else(|| GatewayError::Internal("aggregation received an empty point set".into()))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
