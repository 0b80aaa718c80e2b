//! Cache Entry Module
//!
//! A memoized aggregation result with its insertion and expiry times.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::geo::GeoResult;

// == Cache Entry ==
/// A single cached result. Owned by the response cache, never handed out.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The memoized result
    pub value: GeoResult,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Tick of the most recent access in the recency index
    pub last_used: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry inserted at `now_ms` that lives for `ttl`.
    pub fn created_at(value: GeoResult, now_ms: u64, ttl: Duration, last_used: u64) -> Self {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
            last_used,
        }
    }

    // == Is Expired ==
    /// An entry inserted at T is expired for any time >= T + TTL.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Bounds, Centroid};

    fn sample() -> GeoResult {
        GeoResult {
            centroid: Centroid { lat: 1.0, lng: 2.0 },
            bounds: Bounds {
                north: 1.0,
                south: 1.0,
                east: 2.0,
                west: 2.0,
            },
        }
    }

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::created_at(sample(), 5_000, Duration::from_secs(60), 7);

        assert_eq!(entry.value, sample());
        assert_eq!(entry.expires_at - entry.created_at, 60_000);
        assert_eq!(entry.last_used, 7);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::created_at(sample(), 1_000, Duration::from_secs(1), 0);

        assert!(!entry.is_expired_at(1_999));
        assert!(entry.is_expired_at(2_000), "Entry should be expired at T + TTL");
        assert!(entry.is_expired_at(5_000));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::created_at(sample(), 1_000, Duration::ZERO, 0);
        assert!(entry.is_expired_at(1_000));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::created_at(sample(), 1_000, Duration::MAX, 0);
        assert_eq!(entry.expires_at, u64::MAX);
    }

    #[test]
    fn test_current_timestamp_is_after_epoch() {
        assert!(current_timestamp_ms() > 0);
    }
}
