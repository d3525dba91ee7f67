//! Error types for the forex gateway.

/// Provider-level errors (what a `RateProvider` can fail with).
///
/// Advisory outcomes such as an out-of-range page are NOT errors; they are
/// returned as `ProviderResponse::Advisory`.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid provider key: {0}")]
    UnknownProvider(String),

    /// Message lists the excluded set rather than the offending code.
    #[error("{0}")]
    InvalidCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{0}")]
    UpstreamFetch(String),

    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),
}

/// Cache adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outbound HTTP errors (distinct from a non-success status code).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Circuit breaker is open")]
    CircuitOpen,
}

/// Invalid provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Provider base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Cache duration must be a positive number of minutes")]
    ZeroCacheDuration,
}

/// Bearer token errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token subject cannot be empty")]
    EmptySubject,

    #[error("Token signing secret must be at least 32 bytes")]
    WeakSecret,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            e @ ProviderError::UnknownProvider(_) => AppError::BadRequest(e.to_string()),
            ProviderError::InvalidCurrency(msg) => AppError::BadRequest(msg),
            e @ ProviderError::InvalidAmount(_) => AppError::BadRequest(e.to_string()),
            ProviderError::UpstreamFetch(msg) => AppError::BadGateway(msg),
            e @ ProviderError::MalformedPayload(_) => AppError::BadGateway(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            e @ TokenError::EmptySubject => AppError::BadRequest(e.to_string()),
            e => AppError::Internal(e.to_string()),
        }
    }
}
