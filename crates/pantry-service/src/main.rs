//! # Pantry Service
//!
//! Opens the inventory database and runs the outbox relay until stopped.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (`RUST_LOG`, default `info,pantry=debug,sqlx=warn`)
//! 2. Load configuration from `PANTRY_*` environment variables
//! 3. Connect to the database and run migrations
//! 4. Spawn the outbox relay
//! 5. Wait for Ctrl+C / SIGTERM, stop the relay, close the pool

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pantry_db::Database;
use pantry_service::{LogPublisher, OutboxRelay, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Pantry inventory service");

    let config = ServiceConfig::load().context("loading configuration")?;
    info!(
        database = %config.database_path.display(),
        conversion_policy = %config.conversion_policy,
        low_stock_alerts = config.low_stock_alerts,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    let (total, applied) = db.migration_status().await?;
    info!(total, applied, "Database ready");

    let publisher = Arc::new(LogPublisher::new("restaurant.inventory"));
    let (relay, relay_handle) = OutboxRelay::new(db.clone(), publisher, config.relay);
    let relay_task = tokio::spawn(relay.run());

    shutdown_signal().await;
    info!("Shutdown signal received");

    relay_handle.shutdown().await;
    relay_task.await.context("joining outbox relay")?;
    db.close().await;

    info!("Shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pantry=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
