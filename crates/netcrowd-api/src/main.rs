//! netcrowd-api: REST API server for netcrowd

use netcrowd_api::{AppState, create_router, spawn_sync_task};
use netcrowd_core::{Config, ReportStore};
use std::time::Duration;

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load_default().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    let store = ReportStore::open_with_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
    if let Some(path) = store.path() {
        tracing::info!(path = %path.display(), reports = store.len(), "Opened report store");
    }
    if !store.is_durable() {
        tracing::warn!("Report store is running in memory only; changes will not be saved");
    }

    let state = AppState::new(store, config.display.locale);
    let sync = spawn_sync_task(
        state.clone(),
        Duration::from_millis(config.api.sync_interval_ms.max(100)),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting netcrowd-api on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sync.abort();
    Ok(())
}
