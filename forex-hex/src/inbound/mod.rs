//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod auth;
mod handlers;
mod rate_limit;
mod server;

pub use auth::{Caller, REQUIRED_ROLES, TOKEN_PATH};
pub use handlers::{ApiError, AppState};
pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState};
pub use server::{API_PREFIX, HttpServer};
