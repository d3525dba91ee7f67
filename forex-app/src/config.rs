//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use forex_adapters::token::TokenConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";
pub const DEFAULT_EXCLUDED_CURRENCIES: &str = "TRY,PLN,THB,MXN";
pub const DEFAULT_TOKEN_ISSUER: &str = "forex-gateway";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub excluded_currencies: Vec<String>,
    pub cache_minutes: u64,
    pub cache_max_entries: u64,
    pub api_keys: Vec<String>,
    pub rate_limit_per_minute: u32,
    pub http_timeout: Duration,
    pub http_retries: u32,
    pub retry_base_delay: Duration,
    pub breaker_failures: u32,
    pub breaker_open: Duration,
    pub otlp_endpoint: Option<String>,
    /// HMAC secret for bearer tokens; tokens are disabled without it.
    pub jwt_secret: Option<String>,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_ttl: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_keys = parse_list(
            &var("API_KEYS")
                .ok_or_else(|| anyhow::anyhow!("API_KEYS environment variable is required"))?,
        );
        if api_keys.is_empty() {
            anyhow::bail!("API_KEYS must contain at least one key");
        }

        let cache_minutes = parse_or(var("FRANKFURTER_CACHE_MINUTES"), "FRANKFURTER_CACHE_MINUTES", 60)?;
        if cache_minutes == 0 {
            anyhow::bail!("FRANKFURTER_CACHE_MINUTES must be greater than zero");
        }

        Ok(Self {
            port: parse_or(var("PORT"), "PORT", 3000)?,
            base_url: var("FRANKFURTER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            excluded_currencies: parse_list(
                &var("FRANKFURTER_EXCLUDED_CURRENCIES")
                    .unwrap_or_else(|| DEFAULT_EXCLUDED_CURRENCIES.to_string()),
            ),
            cache_minutes,
            cache_max_entries: parse_or(var("CACHE_MAX_ENTRIES"), "CACHE_MAX_ENTRIES", 10_000)?,
            api_keys,
            rate_limit_per_minute: parse_or(var("RATE_LIMIT_PER_MINUTE"), "RATE_LIMIT_PER_MINUTE", 10)?,
            http_timeout: Duration::from_secs(parse_or(
                var("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                10,
            )?),
            http_retries: parse_or(var("HTTP_RETRIES"), "HTTP_RETRIES", 3)?,
            retry_base_delay: Duration::from_millis(parse_or(
                var("HTTP_RETRY_BASE_DELAY_MS"),
                "HTTP_RETRY_BASE_DELAY_MS",
                2000,
            )?),
            breaker_failures: parse_or(
                var("CIRCUIT_BREAKER_FAILURES"),
                "CIRCUIT_BREAKER_FAILURES",
                5,
            )?,
            breaker_open: Duration::from_secs(parse_or(
                var("CIRCUIT_BREAKER_OPEN_SECS"),
                "CIRCUIT_BREAKER_OPEN_SECS",
                30,
            )?),
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
            jwt_secret: var("JWT_SECRET"),
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string()),
            jwt_audience: var("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_TOKEN_ISSUER.to_string()),
            jwt_ttl: Duration::from_secs(
                parse_or::<u64>(var("JWT_TTL_MINUTES"), "JWT_TTL_MINUTES", 30)?.saturating_mul(60),
            ),
        })
    }

    /// Token settings, present only when `JWT_SECRET` is set.
    pub fn token_config(&self) -> Option<TokenConfig> {
        self.jwt_secret.as_ref().map(|secret| TokenConfig {
            secret: secret.trim().as_bytes().to_vec(),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
            ttl: self.jwt_ttl,
        })
    }
}

/// Splits a comma-separated list, dropping blank entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {value:?}")),
        None => Ok(default),
    }
}
