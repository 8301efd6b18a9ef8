use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use ctf_connect::app::{router, AppState};
use ctf_connect::auth::{IdentityProvider, RemoteIdentityProvider};
use ctf_connect::config::{self, StoreKind};
use ctf_connect::database::{DatabaseManager, MemoryProfileStore, PgProfileStore, ProfileStore};
use ctf_connect::is_production;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ctf_connect=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting CTF Connect in {:?} mode", config.environment);

    if config.auth.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("AUTH_JWT_SECRET must be set in production");
        }
        tracing::warn!("AUTH_JWT_SECRET is empty; every session will be rejected");
    }

    let profiles: Arc<dyn ProfileStore> = match config.database.store {
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the profile database")?;
            DatabaseManager::migrate(&pool).await?;
            Arc::new(PgProfileStore::new(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory profile store; profiles are lost on restart");
            Arc::new(MemoryProfileStore::new())
        }
    };

    let identity: Arc<dyn IdentityProvider> = Arc::new(RemoteIdentityProvider::from_config(&config.auth)?);

    let app = router(AppState::new(config.clone(), identity, profiles));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("CTF Connect listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
