//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache cleanup: Removes expired cache entries at configured intervals
//! - Limiter sweep: Forgets clients with nothing left in their window

mod cleanup;

pub use cleanup::{spawn_cleanup_task, spawn_sweep_task};
