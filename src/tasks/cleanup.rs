//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired results out of the cache,
//! so memory is reclaimed even for keys that are never looked up again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that removes expired entries every `interval`.
///
/// Returns the task handle; abort it during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = cache::shared(ResponseCache::new(100, Duration::from_secs(60)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(5));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
