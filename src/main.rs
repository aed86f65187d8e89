use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tillstock_api::config;
use tillstock_api::database::{MemoryStore, PgStore, Store};
use tillstock_api::{app, is_production, AppState};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    /// In-process store; data is lost on exit
    Memory,
    /// PostgreSQL JSONB documents (requires DATABASE_URL)
    Postgres,
}

#[derive(Parser)]
#[command(name = "tillstock-api")]
#[command(about = "Tillstock API - multi-tenant point-of-sale and inventory backend")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, default_value = "postgres", help = "Document store backend")]
    store: StoreKind,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = config::config().clone();
    tracing::info!("Starting Tillstock API in {:?} mode", config.environment);
    if is_production!() && config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set in production");
    }
    if let Some(port) = cli.port {
        config.api.port = port;
    }

    let store: Arc<dyn Store> = match cli.store {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => Arc::new(
            PgStore::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?,
        ),
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(store, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Tillstock API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
