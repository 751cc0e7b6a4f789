//! X-ui Usage Bot - Main Entry Point
//!
//! A Telegram bot that reports account usage, quota and expiry from an
//! x-ui panel.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use xui_usage_bot::commands::MessageHandler;
use xui_usage_bot::config::{PanelConfig, TelegramConfig};
use xui_usage_bot::panel::PanelClient;
use xui_usage_bot::refresh::SnapshotRefresher;
use xui_usage_bot::snapshot::SnapshotStore;
use xui_usage_bot::telegram::TelegramBot;

/// Telegram bot reporting x-ui account usage.
#[derive(Parser, Debug)]
#[command(name = "xui_usage_bot")]
#[command(about = "Answer account usage queries from an x-ui panel")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Exit instead of starting when the initial panel login fails.
    #[arg(long)]
    require_login: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;
    let panel_config =
        PanelConfig::from_env().context("Failed to load panel configuration from environment")?;

    info!(
        "Panel: {} (refresh every {}s)",
        panel_config.address, panel_config.refresh_interval_secs
    );

    let mut panel = PanelClient::new(panel_config).context("Failed to create panel client")?;

    if !panel.login().await {
        if args.require_login {
            bail!("Initial panel login failed");
        }
        warn!("Initial panel login failed, the refresher will keep retrying");
    }

    let store = Arc::new(SnapshotStore::new());
    let cancel = CancellationToken::new();

    let refresher = SnapshotRefresher::new(panel, Arc::clone(&store));
    let refresher_handle = tokio::spawn(refresher.run(cancel.clone()));

    let bot = TelegramBot::connect(&tg_config)
        .await
        .context("Failed to connect to Telegram")?;
    bot.ensure_signed_in(&tg_config)
        .await
        .context("Bot sign in failed")?;

    let handler = MessageHandler::new(Arc::clone(&store));

    info!("Bot is running. Use Ctrl+C to stop.");

    let result = tokio::select! {
        result = bot.run(&handler) => result.context("Telegram update loop failed"),
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            Ok(())
        }
    };

    info!("Shutting down...");
    cancel.cancel();
    if let Err(e) = refresher_handle.await {
        warn!("Snapshot refresher task ended abnormally: {}", e);
    }
    bot.disconnect();

    result
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
