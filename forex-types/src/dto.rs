//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Base currency used when the caller does not pass one.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Days before today covered by a historical query without a start date.
pub const DEFAULT_HISTORY_DAYS: u64 = 15;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 5;

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// ─────────────────────────────────────────────────────────────────────────────
// Query DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query for the latest rates.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LatestRatesQuery {
    /// Currency the rates are quoted against
    #[serde(default = "default_base_currency")]
    #[param(example = "USD")]
    pub base_currency: String,
}

/// Query for a point conversion.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    #[param(example = "USD")]
    pub from: String,
    #[param(example = "EUR")]
    pub to: String,
    /// Amount of `from` to convert
    #[serde(with = "rust_decimal::serde::str")]
    #[param(value_type = String, example = "100")]
    pub amount: Decimal,
}

/// Query for one page of historical rates.
#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoricalRatesQuery {
    #[serde(default = "default_base_currency")]
    #[param(example = "USD")]
    pub base_currency: String,
    /// First day of the range (defaults to 15 days ago)
    #[param(value_type = Option<String>, example = "2020-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Last day of the range (defaults to today)
    #[param(value_type = Option<String>, example = "2020-01-10")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_page")]
    #[param(example = 1)]
    pub page: i64,
    /// Days per page
    #[serde(default = "default_page_size")]
    #[param(example = 5)]
    pub page_size: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for issuing a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(example = "alice")]
    pub username: String,
    /// Roles embedded in the token
    #[serde(default)]
    #[schema(example = json!(["User", "Admin"]))]
    pub roles: Vec<String>,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until the token expires
    #[schema(example = 1800)]
    pub expires_in: u64,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Failed to fetch historical rates")]
    pub error: String,
    #[schema(example = 502)]
    pub code: u16,
}
