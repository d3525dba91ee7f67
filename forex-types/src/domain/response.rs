//! Successful provider outcomes.

use std::fmt;

/// What a provider operation hands back on success.
///
/// All three shapes travel as plain strings to the calling layer, but the
/// variant tells it which one it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResponse {
    /// Serialized JSON array of filtered `CurrencyRate`s.
    Rates(String),
    /// Formatted conversion line, e.g. `100 USD = 84.00 EUR`.
    Conversion(String),
    /// User-facing message for a request that produced no data.
    Advisory(String),
}

impl ProviderResponse {
    pub fn as_str(&self) -> &str {
        match self {
            ProviderResponse::Rates(s)
            | ProviderResponse::Conversion(s)
            | ProviderResponse::Advisory(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ProviderResponse::Rates(s)
            | ProviderResponse::Conversion(s)
            | ProviderResponse::Advisory(s) => s,
        }
    }

    pub fn is_advisory(&self) -> bool {
        matches!(self, ProviderResponse::Advisory(_))
    }
}

impl fmt::Display for ProviderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
