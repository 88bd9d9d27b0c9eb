//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Hot Item ==
/// Read-only snapshot of a cached entry, as reported by [`BoundedCache::hot_items`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotItem {
    pub key: String,
    pub access_count: u64,
    /// Milliseconds since insertion
    pub age_ms: u64,
    /// Milliseconds until expiry, 0 once expired
    pub ttl_ms: u64,
}

// == Bounded Cache ==
/// Capacity-limited, time-expiring cache with LRU eviction.
///
/// Capacity eviction and expiry are independent: an unexpired entry can be
/// evicted for being least recently used, and a recently used entry is still
/// dropped once its TTL has passed.
#[derive(Debug)]
pub struct BoundedCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Recency order, front = least recently used
    lru: LruTracker,
    /// Lifetime counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL for entries inserted without an explicit one
    default_ttl: Duration,
}

impl<V: Clone> BoundedCache<V> {
    // == Constructor ==
    /// Creates a new cache with the given capacity and default TTL.
    ///
    /// # Panics
    /// If `capacity` is zero. A zero-capacity cache cannot hold the entry it
    /// is asked to store, so it is rejected as a configuration error.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        assert!(capacity > 0, "cache capacity must be greater than zero");

        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::with_capacity(capacity),
            stats: CacheStats::new(capacity),
            capacity,
            default_ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key, refreshing its recency.
    ///
    /// Unknown and expired keys count as misses; expired entries are removed.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// [`get`](Self::get) against an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_delete();
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access(now);
        let value = entry.value.clone();
        self.lru.touch(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores a value under `key` with the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Stores a value under `key` with an explicit TTL.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    /// Stores a value against an explicit clock reading.
    ///
    /// Any existing entry for `key` is discarded first, so the new entry starts
    /// with fresh creation time and access count. If the cache is then full,
    /// exactly one least recently used entry is evicted to make room.
    pub fn set_at(&mut self, key: impl Into<String>, value: V, ttl: Duration, now: Instant) {
        let key = key.into();

        self.remove_entry(&key);

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value, ttl, now));
        self.lru.touch(&key);
        self.stats.record_set();
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.stats.record_delete();
        }
        removed
    }

    // == Has ==
    /// Checks for a live entry without touching recency or hit/miss counters.
    ///
    /// An expired entry found here is removed like in [`get`](Self::get).
    pub fn has(&mut self, key: &str) -> bool {
        self.has_at(key, Instant::now())
    }

    /// [`has`](Self::has) against an explicit clock reading.
    pub fn has_at(&mut self, key: &str, now: Instant) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.delete(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. Hit and miss counters are left
    /// alone.
    pub fn cleanup(&mut self) -> usize {
        self.cleanup_at(Instant::now())
    }

    /// [`cleanup`](Self::cleanup) against an explicit clock reading.
    pub fn cleanup_at(&mut self, now: Instant) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        expired_keys.len()
    }

    // == Clear ==
    /// Drops every entry and zeroes all counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.reset();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.entries.len();
        stats.capacity = self.capacity;
        stats
    }

    // == Hot Items ==
    /// Returns up to `limit` entries ordered by access count, highest first.
    ///
    /// Ties keep recency order, least recently used first.
    pub fn hot_items(&self, limit: usize) -> Vec<HotItem> {
        self.hot_items_at(limit, Instant::now())
    }

    /// [`hot_items`](Self::hot_items) against an explicit clock reading.
    pub fn hot_items_at(&self, limit: usize, now: Instant) -> Vec<HotItem> {
        let mut items: Vec<HotItem> = self
            .lru
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| HotItem {
                    key: key.to_string(),
                    access_count: entry.access_count,
                    age_ms: entry.age_at(now).as_millis() as u64,
                    ttl_ms: entry.ttl_remaining_at(now).as_millis() as u64,
                })
            })
            .collect();

        // Stable sort keeps recency order between equal counts
        items.sort_by(|a, b| b.access_count.cmp(&a.access_count));
        items.truncate(limit);
        items
    }

    // == Keys ==
    /// Keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().map(str::to_string).collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            true
        } else {
            false
        }
    }
}
