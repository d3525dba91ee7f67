//! Provider lookup by key.

use std::collections::HashMap;
use std::sync::Arc;

use forex_types::{ProviderError, RateProvider};

/// Maps provider keys (the `{provider_key}` path segment) to providers.
///
/// Lookup is exact and case-sensitive.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn RateProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `key`, replacing any previous entry.
    pub fn register(mut self, key: impl Into<String>, provider: Arc<dyn RateProvider>) -> Self {
        self.providers.insert(key.into(), provider);
        self
    }

    /// Resolves a provider key.
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn RateProvider>, ProviderError> {
        self.providers
            .get(key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(key.to_string()))
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.keys())
            .finish()
    }
}
