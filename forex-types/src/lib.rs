//! # Forex Types
//!
//! Domain types and port traits for the forex gateway.
//! This crate has ZERO external IO dependencies - only data structures,
//! pagination rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyRate, ProviderOptions, PageWindow)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Provider, adapter and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{CurrencyRate, PageAdvisory, PageWindow, ProviderOptions, ProviderResponse};
pub use dto::*;
pub use error::{AppError, CacheError, OptionsError, ProviderError, TokenError, TransportError};
pub use ports::{
    CacheStore, Clock, FixedClock, RateProvider, SystemClock, Transport, TransportResponse,
};
