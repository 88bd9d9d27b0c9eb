//! Request Interceptor
//!
//! Composes admission control with read-through/write-through caching around
//! an upstream call supplied by the caller.

use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::cache::SharedCache;
use crate::limiter::{AdmissionController, Rejection};

// == Cache Status ==
/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// A value together with its cache status.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<V> {
    pub value: V,
    pub status: CacheStatus,
}

/// Builds a deterministic cache key of the form `prefix:part:part`.
///
/// `%` and `:` inside a part are percent-escaped, so distinct part lists
/// never map to the same key.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push(':');
        for ch in part.chars() {
            match ch {
                '%' => key.push_str("%25"),
                ':' => key.push_str("%3A"),
                _ => key.push(ch),
            }
        }
    }
    key
}

// == Read Through ==
/// Serves `key` from the cache, or runs `fetch` and caches its `Ok` result.
///
/// Errors from `fetch` are returned as-is and never cached. The cache lock
/// is released while `fetch` runs.
pub async fn read_through<V, F, Fut, E>(
    cache: &SharedCache<V>,
    key: &str,
    fetch: F,
) -> Result<Lookup<V>, E>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    let cached = cache.write().await.get(key);
    if let Some(value) = cached {
        debug!(key, "Cache hit");
        return Ok(Lookup {
            value,
            status: CacheStatus::Hit,
        });
    }

    debug!(key, "Cache miss, calling upstream");
    let value = fetch().await?;
    cache.write().await.set(key, value.clone());

    Ok(Lookup {
        value,
        status: CacheStatus::Miss,
    })
}

// == Intercept Error ==
#[derive(Debug, Error)]
pub enum InterceptError<E> {
    /// Turned away by the admission controller; no upstream work was done
    #[error("request rejected: {0}")]
    Rejected(Rejection),

    /// The upstream call failed; nothing was cached
    #[error("upstream call failed: {0}")]
    Upstream(E),
}

// == Interceptor ==
/// Admission control plus response caching for one endpoint.
#[derive(Debug, Clone)]
pub struct Interceptor<V> {
    limiter: AdmissionController,
    cache: SharedCache<V>,
}

impl<V: Clone> Interceptor<V> {
    pub fn new(limiter: AdmissionController, cache: SharedCache<V>) -> Self {
        Self { limiter, cache }
    }

    pub fn limiter(&self) -> &AdmissionController {
        &self.limiter
    }

    pub fn cache(&self) -> &SharedCache<V> {
        &self.cache
    }

    /// Admits `client_id`, then serves `key` through the cache.
    ///
    /// The admission is held until the returned future completes or is
    /// dropped, and released exactly once either way.
    pub async fn handle<F, Fut, E>(
        &self,
        client_id: &str,
        key: &str,
        fetch: F,
    ) -> Result<Lookup<V>, InterceptError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let _permit = self
            .limiter
            .acquire(client_id)
            .map_err(InterceptError::Rejected)?;

        read_through(&self.cache, key, fetch)
            .await
            .map_err(InterceptError::Upstream)
    }
}
