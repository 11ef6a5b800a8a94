//! pantryctl-server: storage backends and HTTP layer for the pantry
//! inventory service.
//!
//! Storage is a set of capability traits ([`store::Store`] and its
//! constituents) with two implementations: Postgres ([`store::PgStore`]) and
//! in-memory ([`store::MemStore`]). The HTTP layer is an axum router that
//! validates input, delegates to whichever store was selected at process
//! start, and shapes JSON responses.

pub mod http;
pub mod store;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
pub use store::{MemStore, PgStore, Store, StoreError};
