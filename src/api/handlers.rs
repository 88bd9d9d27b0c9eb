//! API Handlers
//!
//! HTTP request handlers for the proxy endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::info;

use super::middleware::ClientId;
use crate::cache::{shared, BoundedCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::interceptor::{cache_key, Interceptor, Lookup};
use crate::limiter::AdmissionController;
use crate::models::{
    AdminResponse, CacheStatusResponse, ClearCacheRequest, ClearTarget, DetailQuery,
    HealthResponse, HotItemsQuery, HotItemsResponse, LimiterStatusResponse, SearchQuery,
};
use crate::upstream::{Upstream, UpstreamError, DETAIL_ENDPOINT, SEARCH_ENDPOINT};

/// `HIT` or `MISS`
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Cache key the response was stored under
pub const X_CACHE_KEY: HeaderName = HeaderName::from_static("x-cache-key");

/// Share page the detail endpoint resolves track ids through.
const SONG_PAGE_URL: &str = "https://y.music.163.com/m/song?id=";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Applied to every request by the admission middleware
    pub global_limiter: AdmissionController,
    /// Search results; shares the api limiter with `detail`
    pub search: Interceptor<Value>,
    /// Track details
    pub detail: Interceptor<Value>,
    pub upstream: Arc<dyn Upstream>,
    pub started_at: Instant,
}

impl AppState {
    /// Builds limiters and caches from configuration.
    pub fn new(config: &Config, upstream: Arc<dyn Upstream>) -> Self {
        let api_limiter = AdmissionController::new("api", config.api_limiter.clone());
        let search_cache = BoundedCache::new(config.search_cache_capacity, config.search_cache_ttl());
        let detail_cache = BoundedCache::new(config.detail_cache_capacity, config.detail_cache_ttl());

        Self {
            global_limiter: AdmissionController::new("global", config.global_limiter.clone()),
            search: Interceptor::new(api_limiter.clone(), shared(search_cache)),
            detail: Interceptor::new(api_limiter, shared(detail_cache)),
            upstream,
            started_at: Instant::now(),
        }
    }

    /// The limiter guarding the music endpoints.
    pub fn api_limiter(&self) -> &AdmissionController {
        self.search.limiter()
    }
}

fn cached_response(lookup: Lookup<Value>, key: &str) -> Response {
    let mut response = Json(lookup.value).into_response();
    let headers = response.headers_mut();
    headers.insert(X_CACHE, HeaderValue::from_static(lookup.status.as_str()));
    if let Ok(value) = HeaderValue::from_str(key) {
        headers.insert(X_CACHE_KEY, value);
    }
    response
}

async fn fetch_search(
    upstream: &dyn Upstream,
    name: &str,
    limit: &str,
) -> std::result::Result<Value, UpstreamError> {
    let query = vec![
        ("name".to_string(), name.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];
    let mut body = upstream.fetch(SEARCH_ENDPOINT, query).await?;

    // Promotional text from the upstream, never shown to clients
    if let Some(fields) = body.as_object_mut() {
        fields.remove("tips");
    }
    Ok(body)
}

async fn fetch_detail(
    upstream: &dyn Upstream,
    id: &str,
    level: &str,
    format: &str,
) -> std::result::Result<Value, UpstreamError> {
    let query = vec![
        ("url".to_string(), format!("{SONG_PAGE_URL}{id}")),
        ("level".to_string(), level.to_string()),
        ("type".to_string(), format.to_string()),
    ];
    upstream.fetch(DETAIL_ENDPOINT, query).await
}

/// Handler for GET /api/music/search
pub async fn search_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let name = query.validate().map_err(ApiError::InvalidRequest)?;
    let limit = query.limit().to_string();
    let key = cache_key("search", &[name, &limit]);

    let lookup = state
        .search
        .handle(&client, &key, || {
            fetch_search(state.upstream.as_ref(), name, &limit)
        })
        .await?;

    Ok(cached_response(lookup, &key))
}

/// Handler for GET /api/music/detail
pub async fn detail_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    query: std::result::Result<Query<DetailQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let id = query.validate().map_err(ApiError::InvalidRequest)?;
    let level = query.level();
    let format = query.format();
    let key = cache_key("detail", &[id, level, format]);

    let lookup = state
        .detail
        .handle(&client, &key, || {
            fetch_detail(state.upstream.as_ref(), id, level, format)
        })
        .await?;

    Ok(cached_response(lookup, &key))
}

/// Handler for GET /api/status/limiter
pub async fn limiter_status_handler(State(state): State<AppState>) -> Json<LimiterStatusResponse> {
    Json(LimiterStatusResponse::new(
        state.global_limiter.status(),
        state.api_limiter().status(),
        state.started_at.elapsed().as_secs(),
    ))
}

/// Handler for GET /api/status/cache
pub async fn cache_status_handler(State(state): State<AppState>) -> Json<CacheStatusResponse> {
    let search = state.search.cache().read().await.stats();
    let detail = state.detail.cache().read().await.stats();

    Json(CacheStatusResponse {
        search_cache: search.into(),
        detail_cache: detail.into(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Handler for GET /api/status/cache/hot
pub async fn hot_items_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<HotItemsQuery>, QueryRejection>,
) -> Result<Json<HotItemsResponse>> {
    let Query(query) = query?;
    let limit = query.limit();

    Ok(Json(HotItemsResponse {
        search_cache: state.search.cache().read().await.hot_items(limit),
        detail_cache: state.detail.cache().read().await.hot_items(limit),
    }))
}

/// Handler for POST /api/cache/clear
///
/// An empty body clears both caches.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AdminResponse>> {
    let target = if body.iter().all(u8::is_ascii_whitespace) {
        ClearTarget::All
    } else {
        serde_json::from_slice::<ClearCacheRequest>(&body)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid clear request: {e}")))?
            .target
    };

    if matches!(target, ClearTarget::Search | ClearTarget::All) {
        state.search.cache().write().await.clear();
    }
    if matches!(target, ClearTarget::Detail | ClearTarget::All) {
        state.detail.cache().write().await.clear();
    }

    info!(target = target.as_str(), "Cache cleared");
    Ok(Json(AdminResponse::new(format!(
        "Cleared {} cache",
        target.as_str()
    ))))
}

/// Handler for POST /api/limiter/reset
pub async fn limiter_reset_handler(State(state): State<AppState>) -> Json<AdminResponse> {
    state.global_limiter.reset();
    state.api_limiter().reset();

    info!("Limiters reset");
    Json(AdminResponse::new("Limiters reset"))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
