//! # Forex Adapters
//!
//! Concrete outbound adapters for the forex gateway.
//! This crate provides implementations of the `CacheStore` and `Transport`
//! ports, plus the resilience decorators wrapped around the transport.
//!
//! - `cache` - bounded TTL cache store (moka)
//! - `http` - reqwest transport
//! - `resilience` - retry with exponential backoff, circuit breaker
//! - `security` - API key hashing used by the inbound auth layer
//! - `token` - HS256 bearer tokens with role claims

pub mod cache;
pub mod http;
pub mod resilience;
pub mod security;
pub mod token;

pub use cache::MemoryCache;
pub use http::ReqwestTransport;
pub use token::{Claims, TokenConfig, TokenIssuer};
pub use resilience::{
    CircuitBreakerConfig, CircuitBreakerTransport, CircuitState, RetryPolicy, RetryTransport,
};

/// The transport stack used in production: retries wrap the breaker so each
/// attempt is counted, and an open circuit ends the retry loop.
pub type ResilientTransport = RetryTransport<CircuitBreakerTransport<ReqwestTransport>>;

/// Builds the production transport stack around `base`.
pub fn build_transport(
    base: ReqwestTransport,
    retry: RetryPolicy,
    breaker: CircuitBreakerConfig,
) -> ResilientTransport {
    RetryTransport::new(CircuitBreakerTransport::new(base, breaker), retry)
}
