use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use campaign_logs_api::{
    app,
    config::{Config, StorageBackend},
    middleware,
};
use domain::services::{InMemoryLogStore, LogStore};
use persistence::repositories::LogEntryRepository;

async fn open_store(config: &Config) -> Result<Arc<dyn LogStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Ok(Arc::new(LogEntryRepository::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory log storage; logs are lost on restart");
            Ok(Arc::new(InMemoryLogStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting Campaign Logs API v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await?;
    let addr = config.socket_addr();
    let app = app::create_app(config, store);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
