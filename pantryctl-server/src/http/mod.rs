//! HTTP layer.
//!
//! Axum router with:
//! - Per-resource route modules under `/api`
//! - JSON error responses (`{"error": "..."}` on every failure path)
//! - Request tracing
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig};
