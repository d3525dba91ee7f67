//! Parsing and flattening of Frankfurter response bodies.
//!
//! The latest endpoint returns a single-level `rates` object dated by the
//! top-level `date`; the range endpoint returns `rates` keyed by day. Both are
//! flattened into `CurrencyRate`s with excluded currencies dropped.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use forex_types::{CurrencyRate, ProviderError, ProviderOptions};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Number;

#[derive(Debug, Deserialize)]
struct LatestPayload {
    date: Option<NaiveDate>,
    rates: BTreeMap<String, Number>,
}

#[derive(Debug, Deserialize)]
struct HistoricalPayload {
    rates: BTreeMap<NaiveDate, BTreeMap<String, Number>>,
}

#[derive(Debug, Deserialize)]
struct ConversionPayload {
    rates: Option<BTreeMap<String, Number>>,
}

/// Flattens a `/latest` body. `fallback_date` is used when the body is undated.
pub fn latest_rates(
    body: &str,
    fallback_date: NaiveDate,
    options: &ProviderOptions,
) -> Result<Vec<CurrencyRate>, ProviderError> {
    let payload: LatestPayload = parse(body)?;
    let date = payload.date.unwrap_or(fallback_date);

    filter_day(date, payload.rates, options)
}

/// Flattens a `/{start}..{end}` body, oldest day first.
pub fn historical_rates(
    body: &str,
    options: &ProviderOptions,
) -> Result<Vec<CurrencyRate>, ProviderError> {
    let payload: HistoricalPayload = parse(body)?;

    let mut flattened = Vec::new();
    for (date, rates) in payload.rates {
        flattened.extend(filter_day(date, rates, options)?);
    }
    Ok(flattened)
}

/// Reads `rates.{to}` from a conversion body. `None` when the rate is absent.
pub fn conversion_rate(body: &str, to: &str) -> Result<Option<Decimal>, ProviderError> {
    let payload: ConversionPayload = parse(body)?;

    payload
        .rates
        .and_then(|rates| rates.get(to).cloned())
        .map(|n| to_decimal(&n))
        .transpose()
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::MalformedPayload(e.to_string()))
}

fn filter_day(
    date: NaiveDate,
    rates: BTreeMap<String, Number>,
    options: &ProviderOptions,
) -> Result<Vec<CurrencyRate>, ProviderError> {
    rates
        .into_iter()
        .filter(|(code, _)| !options.is_excluded(code))
        .map(|(code, n)| Ok(CurrencyRate::new(date, code, to_decimal(&n)?)))
        .collect()
}

fn to_decimal(n: &Number) -> Result<Decimal, ProviderError> {
    let raw = n.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| ProviderError::MalformedPayload(format!("invalid rate {}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ProviderOptions {
        ProviderOptions::new("http://upstream", ["TRY", "PLN"], 10).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_latest_uses_response_date_and_filters() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2024-01-02",
            "rates":{"EUR":0.91,"TRY":30.1,"GBP":0.79}}"#;

        let rates = latest_rates(body, date(2024, 1, 3), &options()).unwrap();

        let codes: Vec<_> = rates.iter().map(|r| r.currency_code()).collect();
        assert_eq!(codes, ["EUR", "GBP"]);
        assert!(rates.iter().all(|r| r.date() == date(2024, 1, 2)));
        assert_eq!(rates[0].rate(), Decimal::from_str("0.91").unwrap());
    }

    #[test]
    fn test_latest_without_date_uses_fallback() {
        let body = r#"{"rates":{"EUR":0.91}}"#;
        let rates = latest_rates(body, date(2024, 1, 3), &options()).unwrap();
        assert_eq!(rates[0].date(), date(2024, 1, 3));
    }

    #[test]
    fn test_historical_flattens_every_day() {
        let body = r#"{"amount":1.0,"base":"USD","start_date":"2020-01-02","end_date":"2020-01-03",
            "rates":{"2020-01-03":{"EUR":0.8969,"PLN":3.81},"2020-01-02":{"EUR":0.8929,"PLN":3.80}}}"#;

        let rates = historical_rates(body, &options()).unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].date(), date(2020, 1, 2));
        assert_eq!(rates[1].date(), date(2020, 1, 3));
        assert!(rates.iter().all(|r| r.currency_code() == "EUR"));
    }

    #[test]
    fn test_missing_rates_is_malformed() {
        let result = historical_rates(r#"{"message":"not found"}"#, &options());
        assert!(matches!(result, Err(ProviderError::MalformedPayload(_))));
    }

    #[test]
    fn test_scientific_rate() {
        let body = r#"{"date":"2024-01-02","rates":{"BTC":1.5e-5}}"#;
        let rates = latest_rates(body, date(2024, 1, 2), &options()).unwrap();
        assert_eq!(rates[0].rate(), Decimal::from_str("0.000015").unwrap());
    }

    #[test]
    fn test_conversion_rate_lookup() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2024-01-02","rates":{"EUR":0.84}}"#;
        assert_eq!(
            conversion_rate(body, "EUR").unwrap(),
            Some(Decimal::from_str("0.84").unwrap())
        );
        assert_eq!(conversion_rate(body, "GBP").unwrap(), None);
        assert_eq!(conversion_rate(r#"{"message":"not found"}"#, "EUR").unwrap(), None);
    }

    #[test]
    fn test_conversion_rate_rejects_non_json() {
        let result = conversion_rate("<html>bad gateway</html>", "EUR");
        assert!(matches!(result, Err(ProviderError::MalformedPayload(_))));
    }
}
