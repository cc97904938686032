use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use quad_api::state::{AppState, AuthSettings};
use quad_api::{app, jobs};
use quad_core::mailer::{LogMailer, Mailer};
use quad_core::repository::UserStore;
use quad_events::EventStore;
use quad_favourites::FavouriteStore;
use quad_store::app_config::Config;
use quad_store::{
    DbClient, MongoEventStore, MongoFavouriteStore, MongoUserStore, MongoVendorRequestStore,
};
use quad_vendor::{RequestLifecycle, VendorRequestStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quad_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load configuration")?;
    tracing::info!("Starting Quad API on port {}", config.server.port);

    let db = DbClient::connect(&config.database.url, &config.database.name)
        .await
        .context("failed to connect to MongoDB")?;

    let events: Arc<dyn EventStore> = Arc::new(MongoEventStore::new(db.clone()));
    let favourites: Arc<dyn FavouriteStore> = Arc::new(MongoFavouriteStore::new(db.clone()));
    let vendor_requests: Arc<dyn VendorRequestStore> =
        Arc::new(MongoVendorRequestStore::new(db.clone()));
    let users: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(db));
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

    let lifecycle = Arc::new(RequestLifecycle::new(
        vendor_requests.clone(),
        events.clone(),
        users.clone(),
        mailer.clone(),
        config.business_rules.payment_window_days,
    ));

    let state = AppState {
        events,
        favourites,
        vendor_requests,
        users,
        mailer,
        lifecycle,
        auth: AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    jobs::spawn_background_jobs(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
