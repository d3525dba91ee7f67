//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! Providers and the application layer depend on these traits, not on
//! concrete cache stores or HTTP clients.

mod cache;
mod clock;
mod provider;
mod transport;

pub use cache::CacheStore;
pub use clock::{Clock, FixedClock, SystemClock};
pub use provider::RateProvider;
pub use transport::{Transport, TransportResponse};
