//! Geo Gateway - validating, caching gateway for point-set aggregation
//!
//! Accepts point sets, validates them, and returns their centroid and
//! bounding box, either computed locally or proxied to a remote backend,
//! with results memoized in a TTL/LRU cache.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod live;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use tasks::spawn_cleanup_task;
