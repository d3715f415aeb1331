//! webdraw — shared drawing-canvas server.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────┐
//!                  │                   WEBDRAW                     │
//!                  │                                               │
//!   TCP connection │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   ───────────────┼─▶│   net    │──▶│   http   │──▶│  routing  │  │
//!                  │  │ listener │   │ conn loop│   │           │  │
//!                  │  └──────────┘   └──────────┘   └─────┬─────┘  │
//!                  │                                      │        │
//!                  │                                      ▼        │
//!                  │  ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//!   HTTP response  │  │ response │◀──│ session  │◀──│  canvas   │  │
//!   ◀──────────────┼──│ writer   │   │ registry │   │ (image)   │  │
//!                  │  └──────────┘   └──────────┘   └───────────┘  │
//!                  │                                               │
//!                  │  config ── observability ── error taxonomy    │
//!                  └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webdraw::config::{load_config, ServerConfig};
use webdraw::http::Server;
use webdraw::net::Listener;

/// Shared drawing-canvas HTTP server.
#[derive(Parser, Debug)]
#[command(name = "webdraw", version)]
struct Args {
    /// Port to listen on (overrides the config file).
    port: Option<u16>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webdraw=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    tracing::info!(
        bind_address = %config.listener.socket_addr(),
        max_connections = config.listener.max_connections,
        idle_expiry_secs = config.session.idle_expiry_secs,
        "webdraw starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => webdraw::observability::metrics::init_metrics(addr),
            Err(err) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %err,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await;
    let server = Server::new(config);
    server.run(listener).await?;

    Ok(())
}
