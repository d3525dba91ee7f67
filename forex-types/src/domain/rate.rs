//! Flattened exchange rate entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single rate quoted against a base currency on a given day.
///
/// This is the filtered representation stored in the cache and handed
/// back to callers as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRate {
    #[schema(value_type = String, example = "2024-01-02")]
    date: NaiveDate,
    #[schema(example = "EUR")]
    currency_code: String,
    #[schema(value_type = f64, example = 0.91)]
    rate: Decimal,
}

impl CurrencyRate {
    pub fn new(date: NaiveDate, currency_code: impl Into<String>, rate: Decimal) -> Self {
        Self {
            date,
            currency_code: currency_code.into(),
            rate,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}
