//! Exchange Rate Providers
//!
//! Adapters that implement the `RateProvider` port against upstream
//! currency-data APIs. Each provider owns the fetch-filter-cache cycle for
//! its upstream:
//!
//! 1. Derive a deterministic cache key for the request
//! 2. Serve a cache hit as-is
//! 3. On a miss, fetch through the injected `Transport`
//! 4. Flatten the body into `CurrencyRate`s, dropping excluded currencies
//! 5. Store the filtered serialization and return it
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use exchange_rates::Frankfurter;
//!
//! let provider = Frankfurter::new(cache, transport, Arc::new(options));
//! let rates = provider.latest_rates("USD").await?;
//! ```

mod frankfurter;
pub mod payload;


pub use frankfurter::{Frankfurter, PROVIDER_KEY, historical_cache_key, latest_cache_key};
