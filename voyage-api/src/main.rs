use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voyage_api::{app, state::{AppState, AuthConfig}};
use voyage_payment::{ChapaAdapter, PaymentOrchestrator, PaymentSettings};
use voyage_store::{
    DbClient, StoreBookingRepository, StoreListingRepository, StorePaymentRepository,
    StoreUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyage_api=debug,voyage_payment=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = voyage_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting Voyage API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let listing_repo = Arc::new(StoreListingRepository::new(db.pool.clone()));
    let booking_repo = Arc::new(StoreBookingRepository::new(db.pool.clone()));
    let user_repo = Arc::new(StoreUserRepository::new(db.pool.clone()));
    let payment_repo = Arc::new(StorePaymentRepository::new(db.pool.clone()));

    let gateway = Arc::new(ChapaAdapter::new(
        config.gateway.base_url.clone(),
        config.gateway.secret_key_env.clone(),
    ));
    let payment_orchestrator = Arc::new(PaymentOrchestrator::new(
        booking_repo.clone(),
        user_repo.clone(),
        payment_repo.clone(),
        gateway,
        PaymentSettings {
            callback_url: config.gateway.callback_url.clone(),
            payer_email: config.gateway.payer_email.clone(),
            default_currency: config.gateway.default_currency.clone(),
        },
    ));

    let app_state = AppState {
        listing_repo,
        booking_repo,
        user_repo,
        payment_repo,
        payment_orchestrator,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
