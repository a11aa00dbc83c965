//! Webhook relay.
//!
//! Accepts any HTTP request and posts a readable summary of it to a chat
//! webhook; WebSocket connections get a notification per message and an
//! echo back.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 WEBHOOK RELAY                │
//!   Client Request     │  ┌────────┐    ┌──────────┐    ┌──────────┐  │
//!   ───────────────────┼─▶│  http  │───▶│  relay   │───▶│ dispatch │──┼──▶ Destination
//!                      │  │ server │    │ decode + │    │ multipart│  │    Webhook
//!                      │  └───┬────┘    │ format   │    └────┬─────┘  │
//!                      │      │         └──────────┘         │        │
//!   Upgrade: websocket │      ▼                              │        │
//!   ◀──────────────────┼─ echo bridge ◀──────────────────────┘        │
//!                      │                                              │
//!                      │  config (toml + env, hot reload) · logging   │
//!                      │  metrics · lifecycle (signals, shutdown)     │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use webhook_relay::config::{self, ConfigWatcher, RelayConfig};
use webhook_relay::observability::{logging, metrics};
use webhook_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "webhook-relay")]
#[command(about = "Relay HTTP requests and WebSocket messages to a chat webhook")]
#[command(long_about = None)]
struct Cli {
    /// TOML configuration file. Watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);
    tracing::info!("webhook-relay v{} starting", env!("CARGO_PKG_VERSION"));

    log_config(&config);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    // Config hot reload. The watcher must outlive the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_config(config: &RelayConfig) {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        inline_body_chars = config.limits.inline_body_chars,
        max_body_size = config.limits.max_body_size,
        notify_before_handshake = config.websocket.notify_before_handshake,
        "Configuration loaded"
    );
}
