//! Recency Index Module
//!
//! Orders cache keys by last access for LRU eviction.

use std::collections::BTreeMap;

use crate::geo::CacheKey;

// == Recency Index ==
/// Access-ordered index over cache keys.
///
/// Every access stamps the key with a fresh tick from a monotonic counter,
/// so the smallest tick held is the least recently used key. The owner keeps
/// each key's current tick and passes it back on the next touch or removal.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    by_tick: BTreeMap<u64, CacheKey>,
    next_tick: u64,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used and returns its new tick.
    ///
    /// `previous` is the tick the key was last stamped with, if any.
    pub fn touch(&mut self, key: &CacheKey, previous: Option<u64>) -> u64 {
        let key = previous
            .and_then(|tick| self.by_tick.remove(&tick))
            .unwrap_or_else(|| key.clone());
        let tick = self.next_tick;
        self.next_tick += 1;
        self.by_tick.insert(tick, key);
        tick
    }

    pub fn forget(&mut self, tick: u64) -> Option<CacheKey> {
        self.by_tick.remove(&tick)
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used key.
    pub fn pop_oldest(&mut self) -> Option<CacheKey> {
        self.by_tick.pop_first().map(|(_, key)| key)
    }
}
