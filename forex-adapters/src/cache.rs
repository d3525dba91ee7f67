//! In-memory cache store with per-entry TTL and a size bound.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use forex_types::{CacheError, CacheStore};
use moka::{Expiry, future::Cache};

const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// Longest lifetime granted to a single entry.
const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Thread-safe string cache with absolute expiration.
///
/// Holds at most `max_entries` entries; beyond that moka evicts by its
/// admission policy.
pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryTtl)
                .build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_string(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn set_string(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            ttl: ttl.min(MAX_TTL),
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_set() {
        let cache = MemoryCache::new();

        assert_eq!(cache.get_string("USD_latestrates_20240102").await.unwrap(), None);

        cache
            .set_string("USD_latestrates_20240102", "[]".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get_string("USD_latestrates_20240102").await.unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(cache.get_string("EUR_latestrates_20240102").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_own_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_string("short", "1".into(), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_string("long", "2".into(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get_string("short").await.unwrap().is_none());
        assert_eq!(cache.get_string("long").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_string("key", "old".into(), Duration::from_millis(50))
            .await
            .unwrap();
        cache
            .set_string("key", "new".into(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get_string("key").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_entry_count_never_exceeds_capacity() {
        let cache = MemoryCache::with_max_entries(2);

        for i in 0..50 {
            cache
                .set_string(&format!("USD_historical_{i}"), "[]".into(), Duration::from_secs(600))
                .await
                .unwrap();
        }
        cache.entries.run_pending_tasks().await;

        assert!(cache.entries.entry_count() <= 2);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let cache = MemoryCache::new();
        cache
            .set_string("key", "value".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();

        assert_eq!(cache.get_string("key").await.unwrap().as_deref(), Some("value"));
    }
}
