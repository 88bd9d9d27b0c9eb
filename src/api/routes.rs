//! API Routes
//!
//! Configures the Axum router with all proxy endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_status_handler, clear_cache_handler, detail_handler, health_handler, hot_items_handler,
    limiter_reset_handler, limiter_status_handler, search_handler, AppState,
};
use super::middleware::global_admission;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Global admission: every route counts against the global limiter
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/status/limiter", get(limiter_status_handler))
        .route("/api/status/cache", get(cache_status_handler))
        .route("/api/status/cache/hot", get(hot_items_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .route("/api/limiter/reset", post(limiter_reset_handler))
        .route("/api/music/search", get(search_handler))
        .route("/api/music/detail", get(detail_handler))
        .layer(middleware::from_fn_with_state(state.clone(), global_admission))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
