//! Cache Module
//!
//! Provides in-memory response caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{BoundedCache, HotItem};

/// A cache shared between request handlers and background tasks.
pub type SharedCache<V> = Arc<RwLock<BoundedCache<V>>>;

/// Wraps a cache for sharing across tasks.
pub fn shared<V: Clone>(cache: BoundedCache<V>) -> SharedCache<V> {
    Arc::new(RwLock::new(cache))
}
