//! HTTP surface: axum router, shared state, handlers and error mapping.

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use self::error::ApiError;
pub use self::server::{build_router, start_server, AppState};
