//! Per-provider settings loaded once at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Settings shared by every request that goes to one upstream provider.
///
/// Built once from configuration and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOptions {
    base_url: String,
    excluded_currencies: Vec<String>,
    cache_duration_minutes: u64,
}

impl ProviderOptions {
    /// Validates and creates provider options.
    ///
    /// Trailing slashes are stripped from `base_url`. Excluded currency codes
    /// are trimmed and de-duplicated, keeping their configured order.
    pub fn new<I, S>(
        base_url: impl Into<String>,
        excluded_currencies: I,
        cache_duration_minutes: u64,
    ) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(OptionsError::EmptyBaseUrl);
        }

        if cache_duration_minutes == 0 {
            return Err(OptionsError::ZeroCacheDuration);
        }

        let mut excluded: Vec<String> = Vec::new();
        for code in excluded_currencies {
            let code = code.as_ref().trim();
            if !code.is_empty() && !excluded.iter().any(|c| c == code) {
                excluded.push(code.to_string());
            }
        }

        Ok(Self {
            base_url,
            excluded_currencies: excluded,
            cache_duration_minutes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn excluded_currencies(&self) -> &[String] {
        &self.excluded_currencies
    }

    pub fn cache_duration_minutes(&self) -> u64 {
        self.cache_duration_minutes
    }

    /// Absolute expiration applied to every cache entry the provider writes.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration_minutes.saturating_mul(60))
    }

    /// Case-sensitive membership test against the excluded set.
    pub fn is_excluded(&self, currency_code: &str) -> bool {
        self.excluded_currencies.iter().any(|c| c == currency_code)
    }
}
