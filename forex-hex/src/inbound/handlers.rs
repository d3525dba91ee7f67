//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{Days, NaiveDate};

use forex_adapters::security::ApiKeys;
use forex_adapters::token::TokenIssuer;
use forex_types::dto::DEFAULT_HISTORY_DAYS;
use forex_types::{
    AppError, Clock, ConvertQuery, HistoricalRatesQuery, LatestRatesQuery, ProviderResponse,
    TokenError, TokenRequest, TokenResponse,
};

use crate::ExchangeService;

/// Application state shared across handlers and middleware.
pub struct AppState {
    pub service: ExchangeService,
    /// Source of "today" for the historical-rates defaults.
    pub clock: Arc<dyn Clock>,
    pub api_keys: ApiKeys,
    /// Bearer token issuer; `None` disables tokens entirely.
    pub tokens: Option<Arc<TokenIssuer>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<forex_types::ProviderError> for ApiError {
    fn from(err: forex_types::ProviderError) -> Self {
        ApiError(err.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "{}", message);
        }

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Rates are already serialized JSON; conversions and advisories are sent as
/// JSON strings so every 200 body parses as JSON.
fn provider_response(response: ProviderResponse) -> Response {
    match response {
        ProviderResponse::Rates(body) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        ProviderResponse::Conversion(line) | ProviderResponse::Advisory(line) => {
            Json(line).into_response()
        }
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Latest rates for a base currency.
#[tracing::instrument(skip(state, query))]
pub async fn latest_rates(
    State(state): State<Arc<AppState>>,
    Path(provider_key): Path<String>,
    query: Result<Query<LatestRatesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let response = state
        .service
        .latest_rates(&provider_key, &query.base_currency)
        .await?;
    Ok(provider_response(response))
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state, query))]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    Path(provider_key): Path<String>,
    query: Result<Query<ConvertQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let response = state
        .service
        .convert(&provider_key, &query.from, &query.to, query.amount)
        .await?;
    Ok(provider_response(response))
}

/// One page of historical rates.
///
/// Missing dates default to the last fifteen days, ending today.
#[tracing::instrument(skip(state, query))]
pub async fn historical_rates(
    State(state): State<Arc<AppState>>,
    Path(provider_key): Path<String>,
    query: Result<Query<HistoricalRatesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let (start, end) = resolve_range(state.clock.today(), query.start_date, query.end_date);

    let response = state
        .service
        .historical_rates(
            &provider_key,
            &query.base_currency,
            start,
            end,
            query.page,
            query.page_size,
        )
        .await?;
    Ok(provider_response(response))
}

/// Issues a bearer token for the given user and roles.
///
/// Returns 404 when no signing secret is configured.
#[tracing::instrument(skip(state, body))]
pub async fn generate_token(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let tokens = state
        .tokens
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Token issuance is not configured".to_string()))?;
    let Json(request) = body?;

    let token = tokens.issue(&request.username, &request.roles)?;
    tracing::info!(subject = %request.username.trim(), roles = ?request.roles, "Issued bearer token");

    Ok(Json(TokenResponse {
        token,
        expires_in: tokens.ttl().as_secs(),
    }))
}

fn resolve_range(
    today: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    let start = start.unwrap_or_else(|| {
        today
            .checked_sub_days(Days::new(DEFAULT_HISTORY_DAYS))
            .unwrap_or(NaiveDate::MIN)
    });
    (start, end.unwrap_or(today))
}
