//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use forex_adapters::security::ApiKeys;
use forex_adapters::token::TokenIssuer;
use forex_types::{Clock, SystemClock};

use super::auth::{TOKEN_PATH, auth_middleware};
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::ExchangeService;
use crate::openapi::ApiDoc;

/// Prefix shared by every gateway route; the provider key follows it.
pub const API_PREFIX: &str = "/api/v1/currency-exchange";

/// HTTP Server for the Forex Gateway API.
pub struct HttpServer {
    state: Arc<AppState>,
    rate_limiter: Arc<RateLimiterState>,
}

impl HttpServer {
    /// Creates a new HTTP server with the default rate limit (10 req/min per key).
    pub fn new(service: ExchangeService, api_keys: ApiKeys) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                clock: Arc::new(SystemClock),
                api_keys,
                tokens: None,
            }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(
        service: ExchangeService,
        api_keys: ApiKeys,
        requests_per_minute: u32,
    ) -> Self {
        let mut server = Self::new(service, api_keys);
        server.rate_limiter = Arc::new(RateLimiterState::per_minute(requests_per_minute));
        server
    }

    /// Replaces the clock used for date defaults.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.clock = Arc::new(clock);
        }
        self
    }

    /// Enables bearer tokens signed and checked by `issuer`.
    pub fn with_tokens(mut self, issuer: TokenIssuer) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.tokens = Some(Arc::new(issuer));
        }
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/{provider_key}/latest-rates", get(handlers::latest_rates))
            .route("/{provider_key}/convert", get(handlers::convert))
            .route(
                "/{provider_key}/historical-rates",
                get(handlers::historical_rates),
            );

        Router::new()
            .route("/health", get(handlers::health))
            .route(TOKEN_PATH, post(handlers::generate_token))
            .nest(API_PREFIX, api)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
