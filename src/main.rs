// src/main.rs
use voltix_trade::adapter::{http, TradingCoordinator};
use voltix_trade::config::Config;
use voltix_trade::domain::errors::{AppError, AppResult};

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting voltix_trade v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Opening balances: crypto {}, forex {}, cfd {}",
        config.venues.crypto_balance,
        config.venues.forex_balance,
        config.venues.cfd_balance
    );

    let coordinator = Arc::new(TradingCoordinator::from_config(&config));
    let app = http::router(coordinator);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", config.server.bind_addr, e)))?;
    log::info!("Listening on http://{}", config.server.bind_addr);
    log::info!("Server is running. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = ctrl_c().await {
        log::error!("Failed to listen for control-c event: {}", e);
        // keep serving; the process can still be stopped externally
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down...");
}
