//! Data receiver service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::listener ──▶ request id ─▶ trace ─▶ timeout ─▶ CORS ──▶ POST /send-data
//!                                                                               │
//!     Client ◀──────────── {"message": ..., "received": <payload>} ◀────────────┘
//! ```
//!
//! Defaults mirror a local development server: `127.0.0.1:5000`, debug logs,
//! every origin allowed.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use data_receiver::config::{load_config, validate_config, ConfigError, ServiceConfig};
use data_receiver::lifecycle::{wait_for_signal, Shutdown};
use data_receiver::observability::{init_logging, init_metrics};
use data_receiver::{net, EchoServer};

#[derive(Parser)]
#[command(name = "data-receiver")]
#[command(about = "Accepts JSON on POST /send-data and echoes it back", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.observability)?;

    tracing::info!("data-receiver v{} starting", env!("CARGO_PKG_VERSION"));

    let server = EchoServer::new(config);
    let config = server.config();
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_size = config.limits.max_body_size,
        request_timeout_secs = config.timeouts.request_secs,
        allowed_origins = ?config.cors.allowed_origins,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        init_metrics(addr)?;
    }

    let listener = net::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let signals = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signals.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
