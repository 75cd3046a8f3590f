//! # Marquee Server
//!
//! Entry point: load configuration, open the database, serve until Ctrl-C
//! or SIGTERM.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use marquee_db::{Database, DbConfig};
use marquee_server::{AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    marquee_server::init_tracing();
    info!("Starting Marquee server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        port = config.port,
        db = %config.database_path.display(),
        receipts = %config.receipts_dir.display(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path))
        .await
        .context("opening database")?;

    let bind_address = config.bind_address();
    let state = AppState::new(config, db.clone()).context("building HTTP client")?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;

    marquee_server::serve(listener, state, shutdown_signal()).await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
