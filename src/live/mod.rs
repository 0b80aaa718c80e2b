//! Live Recompute Module
//!
//! Client-side collaborator that turns a stream of input edits into as few
//! gateway calls as possible.
//!
//! # Components
//! - `LiveRecompute`: debounced scheduler with last-scheduled-wins results
//! - `GeoSubmitter`: transport seam, implemented by `HttpGatewayClient` and `Gateway`

mod client;
mod controller;

use async_trait::async_trait;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::geo::{GeoResult, PointSet};

pub use client::HttpGatewayClient;
pub use controller::{LiveOutcome, LiveRecompute, LiveSettings, LiveState};

/// Sends a validated point set somewhere that can process it.
#[async_trait]
pub trait GeoSubmitter: Send + Sync + 'static {
    async fn submit(&self, points: PointSet) -> Result<GeoResult>;
}

#[async_trait]
impl GeoSubmitter for Gateway {
    async fn submit(&self, points: PointSet) -> Result<GeoResult> {
        Ok(self.resolve(points).await?.result)
    }
}
