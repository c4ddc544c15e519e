use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use garagebook::app;
use garagebook::config::{AppConfig, IdentityProviderKind};
use garagebook::db::{BookingStore, SqliteBookingStore};
use garagebook::services::auth::{
    AuthContext, IdentityProvider, RemoteIdentityProvider, StaticIdentityProvider,
};
use garagebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    let store: Arc<dyn BookingStore> = Arc::new(SqliteBookingStore::open(&config.database_url)?);
    tracing::info!("bookings database at {}", config.database_url);

    let identity: Box<dyn IdentityProvider> = match config.identity_provider {
        IdentityProviderKind::Remote => {
            anyhow::ensure!(
                !config.identity_api_key.is_empty(),
                "IDENTITY_API_KEY must be set when IDENTITY_PROVIDER=remote"
            );
            tracing::info!("using remote identity provider (url: {})", config.identity_url);
            Box::new(RemoteIdentityProvider::new(
                config.identity_api_key.clone(),
                config.identity_url.clone(),
            )?)
        }
        IdentityProviderKind::Static => {
            if config.admin_password.is_empty() {
                tracing::warn!("ADMIN_PASSWORD is not set, admin sign-in is disabled");
            } else {
                tracing::info!("using static admin account {}", config.admin_email);
            }
            Box::new(StaticIdentityProvider::new(
                config.admin_email.clone(),
                config.admin_password.clone(),
            ))
        }
    };

    let secret = if config.session_secret.is_empty() {
        tracing::warn!("SESSION_SECRET is not set, sessions will not survive a restart");
        uuid::Uuid::new_v4().to_string()
    } else {
        config.session_secret.clone()
    };
    let auth = AuthContext::new(&secret, config.session_ttl_hours)?;

    tracing::info!(
        bill_policy = ?config.bill_policy,
        status_policy = ?config.status_policy,
        "booking policies"
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config, store, identity, auth));
    let router = app::router(state);

    tracing::info!("starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
