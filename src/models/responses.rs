//! Response DTOs for the proxy API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, HotItem};
use crate::limiter::LimiterStatus;

/// Statistics of one cache, as served by `GET /api/status/cache`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
    /// hits / (hits + misses), 0 when no lookups were made
    pub hit_rate: f64,
    /// `size/capacity`
    pub usage: String,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            usage: format!("{}/{}", stats.size, stats.capacity),
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            deletes: stats.deletes,
            evictions: stats.evictions,
            size: stats.size,
            capacity: stats.capacity,
        }
    }
}

/// Response body for `GET /api/status/cache`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatusResponse {
    pub search_cache: CacheStatsResponse,
    pub detail_cache: CacheStatsResponse,
    pub timestamp: String,
}

/// Response body for `GET /api/status/cache/hot`
#[derive(Debug, Clone, Serialize)]
pub struct HotItemsResponse {
    pub search_cache: Vec<HotItem>,
    pub detail_cache: Vec<HotItem>,
}

/// Response body for `GET /api/status/limiter`
///
/// The global limiter's fields sit at the top level.
#[derive(Debug, Clone, Serialize)]
pub struct LimiterStatusResponse {
    #[serde(flatten)]
    pub global: LimiterStatus,
    /// Limiter shared by the music endpoints
    pub api: LimiterStatus,
    pub timestamp: String,
    pub uptime_secs: u64,
}

impl LimiterStatusResponse {
    pub fn new(global: LimiterStatus, api: LimiterStatus, uptime_secs: u64) -> Self {
        Self {
            global,
            api,
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs,
        }
    }
}

/// Response body for the administrative endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AdminResponse {
    pub message: String,
}

impl AdminResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
