//! # Forex Gateway
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the resilient upstream transport and the in-memory cache
//! - Register the Frankfurter provider
//! - Enable bearer tokens when a signing secret is set
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exchange_rates::{Frankfurter, PROVIDER_KEY};
use forex_adapters::{
    CircuitBreakerConfig, MemoryCache, ReqwestTransport, RetryPolicy, build_transport,
    security::ApiKeys, token::TokenIssuer,
};
use forex_hex::{ExchangeService, ProviderRegistry, inbound::HttpServer};
use forex_types::ProviderOptions;

fn init_tracer(endpoint: &str) -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("forex-gateway"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let otel = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,forex_app=debug,forex_hex=debug,exchange_rates=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting forex gateway on port {}", config.port);
    tracing::info!(
        upstream = %config.base_url,
        excluded = ?config.excluded_currencies,
        cache_minutes = config.cache_minutes,
        "Using upstream provider {}",
        PROVIDER_KEY
    );

    // Outbound stack: retry -> circuit breaker -> reqwest
    let transport = build_transport(
        ReqwestTransport::new(config.http_timeout)?,
        RetryPolicy {
            retries: config.http_retries,
            base_delay: config.retry_base_delay,
        },
        CircuitBreakerConfig {
            failure_threshold: config.breaker_failures,
            open_duration: config.breaker_open,
        },
    );

    let options = ProviderOptions::new(
        config.base_url.as_str(),
        &config.excluded_currencies,
        config.cache_minutes,
    )?;
    let provider = Frankfurter::new(
        MemoryCache::with_max_entries(config.cache_max_entries),
        transport,
        Arc::new(options),
    );

    let registry = ProviderRegistry::new().register(PROVIDER_KEY, Arc::new(provider));
    let service = ExchangeService::new(registry);

    // Create and run the HTTP server
    let api_keys = ApiKeys::from_raw(&config.api_keys);
    tracing::info!("Accepting {} API key(s)", api_keys.len());

    let mut server = HttpServer::with_rate_limit(service, api_keys, config.rate_limit_per_minute);
    if let Some(token_config) = config.token_config() {
        let issuer = TokenIssuer::new(&token_config)
            .map_err(|e| anyhow::anyhow!("JWT_SECRET rejected: {e}"))?;
        tracing::info!(
            issuer = %token_config.issuer,
            audience = %token_config.audience,
            "Bearer tokens enabled"
        );
        server = server.with_tokens(issuer);
    }
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        if let Err(e) = provider.shutdown() {
            tracing::warn!("Failed to flush traces on shutdown: {}", e);
        }
    }
    Ok(())
}
