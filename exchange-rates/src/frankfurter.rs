//! Frankfurter rate provider.
//!
//! Implements fetch-filter-cache against the Frankfurter REST API:
//! - latest rates, cached once per base currency per calendar day
//! - historical rates, paginated into day windows, cached per page
//! - point conversion, never cached

use std::sync::Arc;

use chrono::NaiveDate;
use forex_types::ports::SystemClock;
use forex_types::{
    CacheStore, Clock, CurrencyRate, PageWindow, ProviderError, ProviderOptions, ProviderResponse,
    RateProvider, Transport,
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};
use urlencoding::encode;

use crate::payload;

/// Registry key under which this provider is exposed.
pub const PROVIDER_KEY: &str = "Frankfurter";

const LATEST_FETCH_FAILED: &str = "Failed to fetch the needed rates";
const HISTORICAL_FETCH_FAILED: &str = "Failed to fetch historical rates";
const CONVERSION_FETCH_FAILED: &str = "Failed to fetch the conversion rate";

/// Cache key for the latest rates of `base_currency` on `day`.
pub fn latest_cache_key(base_currency: &str, day: NaiveDate) -> String {
    format!("{}_latestrates_{}", base_currency, day.format("%Y%m%d"))
}

/// Cache key for one page of a historical range.
///
/// Every (base, range, page, page size) tuple gets its own entry.
pub fn historical_cache_key(
    base_currency: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    page: i64,
    page_size: i64,
) -> String {
    format!(
        "{}_historical_{}_{}_page_{}_pageSize_{}",
        base_currency,
        start_date.format("%Y%m%d"),
        end_date.format("%Y%m%d"),
        page,
        page_size
    )
}

/// Provider backed by the Frankfurter API.
///
/// Generic over the cache store and transport so tests and production
/// wiring can inject their own adapters.
pub struct Frankfurter<C: CacheStore, T: Transport> {
    cache: C,
    transport: T,
    options: Arc<ProviderOptions>,
    clock: Arc<dyn Clock>,
}

impl<C: CacheStore, T: Transport> Frankfurter<C, T> {
    /// Creates a provider that reads "today" from the system clock.
    pub fn new(cache: C, transport: T, options: Arc<ProviderOptions>) -> Self {
        Self {
            cache,
            transport,
            options,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for day-scoped cache keys.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the cached payload, treating an unreadable cache as a miss.
    async fn read_cache(&self, key: &str) -> Option<String> {
        match self.cache.get_string(key).await {
            Ok(Some(cached)) if !cached.is_empty() => {
                debug!(key, "Cache hit");
                Some(cached)
            }
            Ok(_) => {
                debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, falling back to upstream");
                None
            }
        }
    }

    /// Stores the filtered rates and returns their serialization.
    async fn store(&self, key: &str, rates: &[CurrencyRate]) -> Result<String, ProviderError> {
        let serialized = serde_json::to_string(rates)
            .map_err(|e| ProviderError::MalformedPayload(e.to_string()))?;

        if let Err(e) = self
            .cache
            .set_string(key, serialized.clone(), self.options.cache_ttl())
            .await
        {
            warn!(key, error = %e, "Cache write failed");
        }

        Ok(serialized)
    }

    /// Fetches `url`, mapping transport failures and non-success statuses to
    /// `UpstreamFetch` with the given message.
    async fn fetch(&self, url: &str, failure: &str) -> Result<String, ProviderError> {
        match self.transport.get(url).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) => {
                warn!(url, status = response.status, "Upstream returned non-success status");
                Err(ProviderError::UpstreamFetch(failure.to_string()))
            }
            Err(e) => {
                warn!(url, error = %e, "Upstream request failed");
                Err(ProviderError::UpstreamFetch(failure.to_string()))
            }
        }
    }
}

#[async_trait::async_trait]
impl<C: CacheStore, T: Transport> RateProvider for Frankfurter<C, T> {
    async fn latest_rates(&self, base_currency: &str) -> Result<ProviderResponse, ProviderError> {
        let today = self.clock.today();
        let key = latest_cache_key(base_currency, today);

        if let Some(cached) = self.read_cache(&key).await {
            return Ok(ProviderResponse::Rates(cached));
        }

        let url = format!(
            "{}/latest?base={}",
            self.options.base_url(),
            encode(base_currency)
        );
        let body = self.fetch(&url, LATEST_FETCH_FAILED).await?;

        let rates = payload::latest_rates(&body, today, &self.options)?;
        let serialized = self.store(&key, &rates).await?;

        Ok(ProviderResponse::Rates(serialized))
    }

    async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<ProviderResponse, ProviderError> {
        if self.options.is_excluded(from) || self.options.is_excluded(to) {
            return Err(ProviderError::InvalidCurrency(format!(
                "Invalid currency: {}",
                self.options.excluded_currencies().join(",")
            )));
        }

        let url = format!(
            "{}/latest?base={}&symbols={}",
            self.options.base_url(),
            encode(from),
            encode(to)
        );

        // A non-success status usually carries a JSON message without
        // `rates`, which is answered as "not available" below.
        let body = match self.transport.get(&url).await {
            Ok(response) => response.body,
            Err(e) => {
                warn!(url, error = %e, "Upstream request failed");
                return Err(ProviderError::UpstreamFetch(
                    CONVERSION_FETCH_FAILED.to_string(),
                ));
            }
        };

        let Some(rate) = payload::conversion_rate(&body, to)? else {
            return Ok(ProviderResponse::Advisory(format!(
                "Conversion rate not available for {} to {}.",
                from, to
            )));
        };

        let converted = amount
            .checked_mul(rate)
            .ok_or_else(|| ProviderError::InvalidAmount(format!("{} is too large", amount)))?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Ok(ProviderResponse::Conversion(format!(
            "{} {} = {:.2} {}",
            amount, from, converted, to
        )))
    }

    async fn historical_rates(
        &self,
        base_currency: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        page: i64,
        page_size: i64,
    ) -> Result<ProviderResponse, ProviderError> {
        let window = match PageWindow::compute(start_date, end_date, page, page_size) {
            Ok(window) => window,
            Err(advisory) => {
                debug!(%advisory, "Historical page rejected");
                return Ok(ProviderResponse::Advisory(advisory.to_string()));
            }
        };

        let key = historical_cache_key(base_currency, start_date, end_date, page, page_size);

        if let Some(cached) = self.read_cache(&key).await {
            return Ok(ProviderResponse::Rates(cached));
        }

        let url = format!(
            "{}/{}..{}?base={}",
            self.options.base_url(),
            window.start.format("%Y-%m-%d"),
            window.end.format("%Y-%m-%d"),
            encode(base_currency)
        );
        let body = self.fetch(&url, HISTORICAL_FETCH_FAILED).await?;

        let rates = payload::historical_rates(&body, &self.options)?;
        let serialized = self.store(&key, &rates).await?;

        Ok(ProviderResponse::Rates(serialized))
    }
}
