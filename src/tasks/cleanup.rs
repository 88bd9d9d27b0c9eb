//! Periodic Maintenance Tasks
//!
//! Background loops that purge expired cache entries and forget idle limiter
//! clients.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::limiter::AdmissionController;

/// Spawns a background task that periodically removes expired entries.
///
/// The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = shared(BoundedCache::new(500, Duration::from_secs(600)));
/// let handle = spawn_cleanup_task("search", cache.clone(), 300);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    name: &'static str,
    cache: SharedCache<V>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            cache = name,
            "Starting cache cleanup task with interval of {} seconds", cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut guard = cache.write().await;
                let removed = guard.cleanup();
                (removed, guard.len())
            };

            if removed > 0 {
                info!(cache = name, removed, remaining, "Removed expired entries");
            } else {
                debug!(cache = name, "No expired entries found");
            }
        }
    })
}

/// Spawns a background task that periodically drops idle limiter clients.
pub fn spawn_sweep_task(limiter: AdmissionController, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            limiter = limiter.name(),
            "Starting limiter sweep task with interval of {} seconds", sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let dropped = limiter.sweep_idle();
            if dropped > 0 {
                info!(limiter = limiter.name(), dropped, "Forgot idle clients");
            } else {
                debug!(limiter = limiter.name(), "No idle clients to forget");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, BoundedCache};
    use crate::limiter::LimiterConfig;

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = shared(BoundedCache::new(100, Duration::from_secs(300)));
        cache
            .write()
            .await
            .set_with_ttl("expire_soon", "value".to_string(), Duration::from_millis(200));

        let handle = spawn_cleanup_task("test", cache.clone(), 1);

        // Entry expires, then the first cleanup pass runs at ~1s
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.read().await.is_empty(), "Expired entry should have been cleaned up");
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = shared(BoundedCache::new(100, Duration::from_secs(3600)));
        cache.write().await.set("long_lived", "value".to_string());

        let handle = spawn_cleanup_task("test", cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let value = cache.write().await.get("long_lived");
        assert_eq!(value.as_deref(), Some("value"));
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_forgets_idle_clients() {
        let limiter = AdmissionController::new("test", LimiterConfig::new(100, 10, 5));
        limiter.acquire("client").unwrap().release();
        assert_eq!(limiter.status().tracked_clients, 1);

        let handle = spawn_sweep_task(limiter.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(limiter.status().tracked_clients, 0);
        handle.abort();
    }

    #[tokio::test]
    async fn test_tasks_can_be_aborted() {
        let cache = shared(BoundedCache::<String>::new(10, Duration::from_secs(60)));
        let cleanup = spawn_cleanup_task("test", cache, 1);
        let sweep = spawn_sweep_task(AdmissionController::new("test", LimiterConfig::default()), 1);

        cleanup.abort();
        sweep.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cleanup.is_finished(), "Task should be finished after abort");
        assert!(sweep.is_finished(), "Task should be finished after abort");
    }
}
