use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use studyhub_api::app::{app, AppState};
use studyhub_api::config::{self, Environment};
use studyhub_api::database::{MemoryStore, PgStore, StudyStore};
use studyhub_api::vendors::Vendors;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting StudyHub API in {:?} mode", config.environment);

    let store: Arc<dyn StudyStore> = match (&config.database.url, config.environment) {
        (Some(_), _) => Arc::new(PgStore::connect(&config.database).await.context("database connection failed")?),
        (None, Environment::Development) => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
        (None, _) => anyhow::bail!("DATABASE_URL is required outside development"),
    };

    let vendors = Vendors::from_config(&config.vendors).context("vendor client setup failed")?;
    let router = app(AppState::new(config.clone(), store, vendors));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("StudyHub API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
