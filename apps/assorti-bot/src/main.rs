//! # Assorti Admin Bot
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Telegram ◄──► long poll ◄──► Dispatcher ───► REST API (BACKEND_API_URL)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assorti_bot::{polling, BackendClient, BotConfig, Dispatcher, InMemorySessionStore, TelegramClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,assorti=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Assorti admin bot...");

    let config = BotConfig::load().context("Failed to load configuration")?;
    info!(
        backend = %config.backend_url,
        admins = config.admin_ids.len(),
        timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded"
    );

    let backend = BackendClient::new(&config.backend_url, config.request_timeout)
        .context("Failed to build backend client")?;
    let telegram =
        TelegramClient::new(&config.bot_token).context("Failed to build Telegram client")?;

    let dispatcher = Dispatcher::new(
        Arc::new(backend),
        Arc::new(telegram.clone()),
        Arc::new(InMemorySessionStore::new()),
        config.admin_ids.iter().copied(),
    );

    polling::run(&telegram, &dispatcher, shutdown_signal()).await;

    info!("Bot shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, stopping bot...");
}
