//! Intake gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                    INTAKE GATEWAY                    │
//!                        │                                                      │
//!   POST /api/contact    │  ┌──────────┐   ┌────────────┐   ┌──────────────┐    │
//!   ─────────────────────┼─▶│   http   │──▶│ client key │──▶│ rate limiter │    │
//!                        │  │  server  │   │  resolver  │   │ (+ reaper)   │    │
//!                        │  └──────────┘   └────────────┘   └──────┬───────┘    │
//!                        │                                         ▼            │
//!                        │  ┌──────────┐   ┌────────────┐   ┌──────────────┐    │
//!   { success: true }    │  │ response │◀──│  honeypot  │◀──│    schema    │    │
//!   ◀────────────────────┼──│ contract │   │   filter   │   │  validator   │    │
//!                        │  └────▲─────┘   └─────┬──────┘   └──────────────┘    │
//!                        │       │               ▼                              │
//!                        │       │         ┌────────────┐                       │
//!                        │       └─────────│  delivery  │───────────────────────┼──▶ log / webhook / SMTP
//!                        │                 │    sink    │                       │
//!                        │                 └────────────┘                       │
//!                        │  config · observability · lifecycle                  │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use intake_gateway::config::{self, ConfigWatcher};
use intake_gateway::lifecycle::{wait_for_signal, Shutdown};
use intake_gateway::observability::{logging, metrics};
use intake_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "intake-gateway")]
#[command(about = "Rate-limited, spam-filtering intake for contact form submissions", long_about = None)]
struct Args {
    /// TOML config file; watched for rate-limit changes while running
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding config and INTAKE_BIND_ADDRESS
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(config.observability.log_format);
    tracing::info!("intake-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        delivery_timeout_secs = config.delivery.timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher alive for the life of the process.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
