//! Standalone panel probe.
//!
//! Logs in to the configured panel, fetches the inbound list once and
//! prints a per-port summary of the resulting snapshot. Useful to check
//! credentials and connectivity before starting the bot.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use xui_usage_bot::commands::MessageHandler;
use xui_usage_bot::config::PanelConfig;
use xui_usage_bot::panel::PanelClient;
use xui_usage_bot::report::humanize_bytes;
use xui_usage_bot::snapshot::{SnapshotStore, build_snapshot};

/// x-ui panel connectivity probe.
#[derive(Parser, Debug)]
#[command(name = "panel_probe")]
#[command(about = "Fetches the x-ui panel once and summarizes its clients")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Run this text through the bot's lookup and print the reply.
    #[arg(long)]
    lookup: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // A missing .env file is fine, the variables may already be set
    let _ = dotenvy::from_filename(&args.env_file);

    let config = match PanelConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Panel: {}", config.address);

    let mut panel = match PanelClient::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("✗ Failed to create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = panel.establish_session().await {
        eprintln!("✗ Login failed: {e}");
        return ExitCode::FAILURE;
    }
    println!("✓ Logged in");

    let inbounds = match panel.fetch_inbounds().await {
        Ok(i) => i,
        Err(e) => {
            eprintln!("✗ Failed to fetch inbounds: {e}");
            return ExitCode::FAILURE;
        }
    };

    let snapshot = match build_snapshot(&inbounds) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("✗ Failed to build snapshot: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "✓ Fetched {} inbounds, {} clients",
        inbounds.len(),
        snapshot.len()
    );
    if let Some(at) = snapshot.refreshed_at() {
        println!("  built at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();

    for inbound in &inbounds {
        let remark = if inbound.remark.is_empty() {
            "-"
        } else {
            inbound.remark.as_str()
        };
        println!(
            "  inbound {:>5}: {} ({})",
            inbound.port, remark, inbound.protocol
        );
    }
    println!();

    for summary in snapshot.port_summaries() {
        println!(
            "  port {:>5}: {} clients ({} enabled), up {}, down {}",
            summary.port,
            summary.clients,
            summary.enabled,
            humanize_bytes(summary.up),
            humanize_bytes(summary.down)
        );
    }

    if let Some(text) = args.lookup {
        let store = Arc::new(SnapshotStore::new());
        store.publish(snapshot);
        let handler = MessageHandler::new(store);

        println!("\nLookup: {}", truncate(&text, 40));
        println!("{}", handler.handle(&text));
    }

    ExitCode::SUCCESS
}

/// Truncates a string for display.
fn truncate(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", chars[..max_len].iter().collect::<String>())
    }
}
