//! Cache store port.
//!
//! A plain string key/value store with per-entry expiration. Entries are
//! never updated in place, so no compare-and-set contract is needed.

use std::time::Duration;

use crate::error::CacheError;

#[async_trait::async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the stored value, or `None` when the key is absent or expired.
    async fn get_string(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` with an absolute expiration of `ttl` from now.
    async fn set_string(&self, key: &str, value: String, ttl: Duration)
    -> Result<(), CacheError>;
}

#[async_trait::async_trait]
impl<C: CacheStore + ?Sized> CacheStore for std::sync::Arc<C> {
    async fn get_string(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get_string(key).await
    }

    async fn set_string(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        (**self).set_string(key, value, ttl).await
    }
}
