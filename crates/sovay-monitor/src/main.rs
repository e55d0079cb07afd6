//! # sovay-monitor
//!
//! Terminal tail for the realtime channel: connects as one client
//! session, subscribes to a feature bundle (or everything), and prints
//! each received envelope and every status transition until Ctrl-C.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sovay_core::ClientId;
use sovay_events::{Envelope, NAMED_EVENT_KINDS};
use sovay_realtime::{
    RealtimeClient, RealtimeConfig, SubscriptionSet, subscribe_dashboard, subscribe_kinds,
    subscribe_lich_su_tra_lai, subscribe_tin_chap, subscribe_tra_gop,
};
use tracing::info;

/// Which feature bundle to tail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Bundle {
    /// Every named event kind.
    All,
    /// Dashboard refresh feed (contracts + aggregates).
    Dashboard,
    /// Unsecured contract events.
    TinChap,
    /// Installment contract events.
    TraGop,
    /// Interest payment history events.
    LichSu,
}

/// Realtime channel monitor.
#[derive(Parser, Debug)]
#[command(name = "sovay-monitor", about = "Tail the loan-office realtime channel")]
struct Cli {
    /// WebSocket URL (overrides settings).
    #[arg(long)]
    url: Option<String>,

    /// Client token to connect as (generated when omitted).
    #[arg(long)]
    client_id: Option<String>,

    /// Feature bundle to subscribe to.
    #[arg(long, value_enum, default_value_t = Bundle::All)]
    bundle: Bundle,

    /// Path to the settings file (defaults to `~/.sovay/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

fn print_envelope(envelope: &Envelope) {
    let data = serde_json::to_string(&envelope.data).unwrap_or_else(|_| "<unprintable>".into());
    match &envelope.message {
        Some(message) => println!("{:<28} {message}  {data}", envelope.kind.as_str()),
        None => println!("{:<28} {data}", envelope.kind.as_str()),
    }
}

fn subscribe_bundle(client: &RealtimeClient, bundle: Bundle) -> SubscriptionSet {
    let listener = |_: &serde_json::Value, envelope: &Envelope| print_envelope(envelope);
    match bundle {
        Bundle::All => subscribe_kinds(client, &NAMED_EVENT_KINDS, listener),
        Bundle::Dashboard => subscribe_dashboard(client, listener),
        Bundle::TinChap => subscribe_tin_chap(client, listener),
        Bundle::TraGop => subscribe_tra_gop(client, listener),
        Bundle::LichSu => subscribe_lich_su_tra_lai(client, listener),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => sovay_settings::load_settings_from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => sovay_settings::load_settings().context("loading settings")?,
    };

    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    sovay_core::logging::init_subscriber(level);

    let client_id = cli
        .client_id
        .map_or_else(ClientId::generate, ClientId::from_string);
    let mut config = RealtimeConfig::from_settings(&settings.realtime, client_id);
    if let Some(url) = cli.url {
        config.url = url;
    }
    config.auto_connect = false;

    info!(url = %config.url, client_id = %config.client_id, bundle = ?cli.bundle, "starting monitor");

    let client = RealtimeClient::new(config);
    let _status = client.on_status_change(|status| eprintln!("-- status: {status}"));
    let _subscriptions = subscribe_bundle(&client, cli.bundle);

    client.connect();

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("shutting down");
    client.disconnect();

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
