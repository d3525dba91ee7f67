//! Rate provider port.
//!
//! One implementation per upstream currency-data source. The gateway looks
//! providers up by key and never depends on a concrete type.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::ProviderResponse;
use crate::error::ProviderError;

#[async_trait::async_trait]
pub trait RateProvider: Send + Sync + 'static {
    /// Today's rates against `base_currency`, minus excluded currencies.
    async fn latest_rates(&self, base_currency: &str) -> Result<ProviderResponse, ProviderError>;

    /// Converts `amount` of `from` into `to` at the latest rate. Never cached.
    async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<ProviderResponse, ProviderError>;

    /// One page (`page_size` days) of the range `start_date..=end_date`.
    async fn historical_rates(
        &self,
        base_currency: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        page: i64,
        page_size: i64,
    ) -> Result<ProviderResponse, ProviderError>;
}
