//! # Forex Hex
//!
//! Application service layer and HTTP adapter for the forex gateway.
//!
//! ## Architecture
//!
//! - `registry` - provider key to `RateProvider` lookup
//! - `service` - Application service (dispatches by provider key)
//! - `inbound/` - HTTP adapter (Axum server, API key and bearer token auth, rate limiting)
//! - `openapi` - OpenAPI document served under `/swagger-ui`
//!
//! Providers are held as `Arc<dyn RateProvider>`, so any number of upstream
//! sources can sit behind one server.

pub mod inbound;
pub mod openapi;
pub mod registry;
pub mod service;


pub use registry::ProviderRegistry;
pub use service::ExchangeService;
