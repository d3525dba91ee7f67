//! Exchange Application Service
//!
//! Dispatches each operation to the provider named by the request.
//! No caching or validation here; providers own both.

use chrono::NaiveDate;
use forex_types::{ProviderError, ProviderResponse};
use rust_decimal::Decimal;

use crate::registry::ProviderRegistry;

/// Application service for exchange-rate operations.
///
/// Every call resolves `provider_key` through the registry and forwards the
/// arguments unchanged. Provider errors propagate as-is.
#[derive(Debug, Clone)]
pub struct ExchangeService {
    registry: ProviderRegistry,
}

impl ExchangeService {
    /// Creates a new exchange service over the given registry.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Rate Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Latest rates for `base_currency`.
    #[tracing::instrument(skip(self))]
    pub async fn latest_rates(
        &self,
        provider_key: &str,
        base_currency: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        self.registry
            .resolve(provider_key)?
            .latest_rates(base_currency)
            .await
    }

    /// Converts `amount` of `from` into `to`.
    #[tracing::instrument(skip(self), fields(amount = %amount))]
    pub async fn convert(
        &self,
        provider_key: &str,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<ProviderResponse, ProviderError> {
        self.registry
            .resolve(provider_key)?
            .convert(from, to, amount)
            .await
    }

    /// One page of historical rates between `start` and `end`.
    #[tracing::instrument(skip(self))]
    pub async fn historical_rates(
        &self,
        provider_key: &str,
        base_currency: &str,
        start: NaiveDate,
        end: NaiveDate,
        page: i64,
        page_size: i64,
    ) -> Result<ProviderResponse, ProviderError> {
        self.registry
            .resolve(provider_key)?
            .historical_rates(base_currency, start, end, page, page_size)
            .await
    }
}
