//! Mini Proxy - A caching, rate-limited proxy in front of a music API
//!
//! Bounded TTL/LRU caches and per-client admission control, composed by an
//! interceptor and served over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod limiter;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_sweep_task};
