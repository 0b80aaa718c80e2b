//! Cache Module
//!
//! In-memory response cache with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyIndex;
pub use stats::CacheStats;
pub use store::ResponseCache;

/// Response cache shared between in-flight requests.
pub type SharedCache = Arc<RwLock<ResponseCache>>;

/// Wraps a cache for sharing across requests and background tasks.
pub fn shared(cache: ResponseCache) -> SharedCache {
    Arc::new(RwLock::new(cache))
}
