//! API Module
//!
//! HTTP handlers and routing for the proxy REST API.
//!
//! # Endpoints
//! - `GET /api/music/search` - Cached upstream search
//! - `GET /api/music/detail` - Cached upstream track detail
//! - `GET /api/status/limiter` - Limiter snapshot
//! - `GET /api/status/cache` - Cache statistics
//! - `GET /api/status/cache/hot` - Most accessed cache entries
//! - `POST /api/cache/clear` - Empty one or both caches
//! - `POST /api/limiter/reset` - Forget all limiter state
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::{global_admission, resolve_client_id, ClientId};
pub use routes::create_router;
