//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::limiter::LimiterConfig;

// == Config Error ==
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Root URL of the upstream API
    pub upstream_base_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Maximum number of cached search results
    pub search_cache_capacity: usize,
    /// Search result TTL in seconds
    pub search_cache_ttl: u64,
    /// Maximum number of cached track details
    pub detail_cache_capacity: usize,
    /// Track detail TTL in seconds
    pub detail_cache_ttl: u64,
    /// Search cache cleanup interval in seconds
    pub search_cleanup_interval: u64,
    /// Detail cache cleanup interval in seconds
    pub detail_cleanup_interval: u64,
    /// Policy applied to every request
    pub global_limiter: LimiterConfig,
    /// Policy applied to upstream-backed endpoints
    pub api_limiter: LimiterConfig,
    /// Idle limiter client sweep interval in seconds
    pub limiter_sweep_interval: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3001)
    /// - `UPSTREAM_BASE_URL` - Upstream API root (default: https://api.kxzjoker.cn/api)
    /// - `UPSTREAM_TIMEOUT` - Upstream timeout in seconds (default: 10)
    /// - `SEARCH_CACHE_CAPACITY` / `SEARCH_CACHE_TTL` (default: 500 / 600)
    /// - `DETAIL_CACHE_CAPACITY` / `DETAIL_CACHE_TTL` (default: 1000 / 1800)
    /// - `SEARCH_CLEANUP_INTERVAL` / `DETAIL_CLEANUP_INTERVAL` (default: 300 / 600)
    /// - `GLOBAL_WINDOW_MS` / `GLOBAL_MAX_REQUESTS` / `GLOBAL_MAX_CONCURRENT` (default: 60000 / 200 / 50)
    /// - `API_WINDOW_MS` / `API_MAX_REQUESTS` / `API_MAX_CONCURRENT` (default: 60000 / 100 / 30)
    /// - `LIMITER_SWEEP_INTERVAL` - Idle client sweep in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream_base_url: env_or("UPSTREAM_BASE_URL", defaults.upstream_base_url),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT", defaults.upstream_timeout),
            search_cache_capacity: env_or("SEARCH_CACHE_CAPACITY", defaults.search_cache_capacity),
            search_cache_ttl: env_or("SEARCH_CACHE_TTL", defaults.search_cache_ttl),
            detail_cache_capacity: env_or("DETAIL_CACHE_CAPACITY", defaults.detail_cache_capacity),
            detail_cache_ttl: env_or("DETAIL_CACHE_TTL", defaults.detail_cache_ttl),
            search_cleanup_interval: env_or(
                "SEARCH_CLEANUP_INTERVAL",
                defaults.search_cleanup_interval,
            ),
            detail_cleanup_interval: env_or(
                "DETAIL_CLEANUP_INTERVAL",
                defaults.detail_cleanup_interval,
            ),
            global_limiter: LimiterConfig::new(
                env_or("GLOBAL_WINDOW_MS", defaults.global_limiter.window_ms),
                env_or("GLOBAL_MAX_REQUESTS", defaults.global_limiter.max_requests),
                env_or("GLOBAL_MAX_CONCURRENT", defaults.global_limiter.max_concurrent),
            ),
            api_limiter: LimiterConfig::new(
                env_or("API_WINDOW_MS", defaults.api_limiter.window_ms),
                env_or("API_MAX_REQUESTS", defaults.api_limiter.max_requests),
                env_or("API_MAX_CONCURRENT", defaults.api_limiter.max_concurrent),
            ),
            limiter_sweep_interval: env_or(
                "LIMITER_SWEEP_INTERVAL",
                defaults.limiter_sweep_interval,
            ),
        }
    }

    /// Rejects values the cache and limiters cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, bool); 14] = [
            ("UPSTREAM_TIMEOUT", self.upstream_timeout > 0),
            ("SEARCH_CACHE_CAPACITY", self.search_cache_capacity > 0),
            ("SEARCH_CACHE_TTL", self.search_cache_ttl > 0),
            ("DETAIL_CACHE_CAPACITY", self.detail_cache_capacity > 0),
            ("DETAIL_CACHE_TTL", self.detail_cache_ttl > 0),
            ("SEARCH_CLEANUP_INTERVAL", self.search_cleanup_interval > 0),
            ("DETAIL_CLEANUP_INTERVAL", self.detail_cleanup_interval > 0),
            ("GLOBAL_WINDOW_MS", self.global_limiter.window_ms > 0),
            ("GLOBAL_MAX_REQUESTS", self.global_limiter.max_requests > 0),
            ("GLOBAL_MAX_CONCURRENT", self.global_limiter.max_concurrent > 0),
            ("API_WINDOW_MS", self.api_limiter.window_ms > 0),
            ("API_MAX_REQUESTS", self.api_limiter.max_requests > 0),
            ("API_MAX_CONCURRENT", self.api_limiter.max_concurrent > 0),
            ("LIMITER_SWEEP_INTERVAL", self.limiter_sweep_interval > 0),
        ];

        match checks.iter().find(|(_, ok)| !ok) {
            Some((name, _)) => Err(ConfigError::Zero(*name)),
            None => Ok(()),
        }
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.search_cache_ttl)
    }

    pub fn detail_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_cache_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3001,
            upstream_base_url: "https://api.kxzjoker.cn/api".to_string(),
            upstream_timeout: 10,
            search_cache_capacity: 500,
            search_cache_ttl: 600,
            detail_cache_capacity: 1000,
            detail_cache_ttl: 1800,
            search_cleanup_interval: 300,
            detail_cleanup_interval: 600,
            global_limiter: LimiterConfig::new(60_000, 200, 50),
            api_limiter: LimiterConfig::new(60_000, 100, 30),
            limiter_sweep_interval: 60,
        }
    }
}
