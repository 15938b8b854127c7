//! Application entry point: configuration, wiring, and the axum server.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use wedplan::adapters::auth::JwtSessionValidator;
use wedplan::adapters::http::{api_router, AppState};
use wedplan::adapters::postgres::{
    PostgresBookingStore, PostgresCollectionStore, PostgresPaymentIntentRepository,
    PostgresQrSessionRepository, PostgresVendorDirectory,
};
use wedplan::adapters::providers::MerchantLinks;
use wedplan::adapters::rates::{CachedRateFeed, HttpRateFeed};
use wedplan::application::{CollectionService, PaymentService, WebhookService};
use wedplan::config::AppConfig;
use wedplan::ports::SessionValidator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    tracing::info!(
        environment = ?config.server.environment,
        "starting wedplan backend"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    // Persistence adapters
    let collection_store = Arc::new(PostgresCollectionStore::new(pool.clone()));
    let payment_repo = Arc::new(PostgresPaymentIntentRepository::new(pool.clone()));
    let booking_store = Arc::new(PostgresBookingStore::new(pool.clone()));
    let vendor_directory = Arc::new(PostgresVendorDirectory::new(pool.clone()));
    let qr_sessions = Arc::new(PostgresQrSessionRepository::new(pool.clone()));

    // Outward-facing adapters
    let links = Arc::new(MerchantLinks::new(config.payment.clone()));
    let rate_feed = HttpRateFeed::new(
        config.rates.feed_url.clone(),
        config.rates.request_timeout(),
    )?;
    let rates = Arc::new(CachedRateFeed::new(Box::new(rate_feed), &config.rates));

    // Application services
    let state = AppState {
        collections: CollectionService::new(collection_store),
        payments: PaymentService::new(
            payment_repo.clone(),
            booking_store.clone(),
            vendor_directory,
            qr_sessions,
            links,
        ),
        webhooks: WebhookService::new(payment_repo, booking_store),
        rates,
    };

    let validator: Arc<dyn SessionValidator> =
        Arc::new(JwtSessionValidator::new(&config.auth.jwt_secret));

    let app = api_router(state, validator)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    // Config validation has already rejected unparseable origins; the open
    // policy applies only when no origins were configured at all.
    let configured = config.server.cors_origins_list();
    if configured.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = configured
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown signal handler: {}", e);
    }
}
