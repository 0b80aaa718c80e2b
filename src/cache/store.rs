//! Response Cache Module
//!
//! Memoizes aggregation results by canonical key with TTL expiry and LRU eviction.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, RecencyIndex};
use crate::error::{GatewayError, Result};
use crate::geo::{CacheKey, GeoResult};

// == Response Cache ==
/// Capacity- and TTL-bounded result cache.
///
/// Not internally synchronized; share it behind a lock so each operation,
/// including its recency and count bookkeeping, is applied atomically.
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, CacheEntry>,
    recency: RecencyIndex,
    /// Resident keys ordered by expiry time
    expiry: BTreeSet<(u64, CacheKey)>,
    stats: CacheStats,
    max_entries: usize,
    ttl: Duration,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` results for `ttl` each.
    ///
    /// A capacity of zero disables caching.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyIndex::new(),
            expiry: BTreeSet::new(),
            stats: CacheStats::new(),
            max_entries,
            ttl,
        }
    }

    // == Get ==
    /// Looks up a result. Expired entries are dropped and count as misses.
    pub fn get(&mut self, key: &CacheKey) -> Option<GeoResult> {
        self.get_at(key, current_timestamp_ms())
    }

    pub fn get_at(&mut self, key: &CacheKey, now_ms: u64) -> Option<GeoResult> {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired_at(now_ms) {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            debug!(key = %key, "cache entry expired on lookup");
            return None;
        }

        entry.last_used = self.recency.touch(key, Some(entry.last_used));
        self.stats.record_hit();
        Some(entry.value)
    }

    // == Put ==
    /// Stores a result, resetting the TTL if the key is already present.
    ///
    /// Inserting a new key at capacity first removes exactly one resident
    /// entry and returns its key: an already expired entry if there is one,
    /// otherwise the least recently used.
    pub fn put(&mut self, key: CacheKey, value: GeoResult) -> Result<Option<CacheKey>> {
        self.put_at(key, value, current_timestamp_ms())
    }

    pub fn put_at(
        &mut self,
        key: CacheKey,
        value: GeoResult,
        now_ms: u64,
    ) -> Result<Option<CacheKey>> {
        if self.max_entries == 0 {
            return Ok(None);
        }

        let replaced = self.remove_entry(&key).is_some();
        let evicted = if !replaced && self.entries.len() >= self.max_entries {
            Some(self.make_room(now_ms)?)
        } else {
            None
        };

        let tick = self.recency.touch(&key, None);
        let entry = CacheEntry::created_at(value, now_ms, self.ttl, tick);
        self.expiry.insert((entry.expires_at, key.clone()));
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());

        Ok(evicted)
    }

    /// Frees one slot, preferring an expired resident over a live one.
    fn make_room(&mut self, now_ms: u64) -> Result<CacheKey> {
        let expired = self
            .expiry
            .first()
            .filter(|(expires_at, _)| now_ms >= *expires_at)
            .map(|(_, key)| key.clone());
        if let Some(key) = expired {
            self.remove_entry(&key);
            self.stats.record_expirations(1);
            debug!(key = %key, "reclaimed expired cache entry");
            return Ok(key);
        }

        let oldest = self.recency.pop_oldest().ok_or_else(|| {
            GatewayError::Internal(format!(
                "cache holds {} entries but recency index is empty",
                self.entries.len()
            ))
        })?;
        let entry = self.entries.remove(&oldest).ok_or_else(|| {
            GatewayError::Internal(format!(
                "recency index referenced missing cache key {}",
                oldest
            ))
        })?;
        self.expiry.remove(&(entry.expires_at, oldest.clone()));
        self.stats.record_eviction();
        debug!(
            key = %oldest,
            age_ms = now_ms.saturating_sub(entry.created_at),
            "evicted least recently used cache entry"
        );
        Ok(oldest)
    }

    fn remove_entry(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.forget(entry.last_used);
        self.expiry.remove(&(entry.expires_at, key.clone()));
        Some(entry)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    pub fn cleanup_expired_at(&mut self, now_ms: u64) -> usize {
        let mut removed = 0;
        while let Some((expires_at, key)) = self.expiry.first().cloned() {
            if now_ms < expires_at {
                break;
            }
            self.remove_entry(&key);
            removed += 1;
        }

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }
}
