//! tenant-proxy (v1)
//!
//! A config-driven, multi-tenant HTTP proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    TENANT PROXY                       │
//!                     │                                                       │
//!   Client Request    │  ┌─────────┐   ┌──────────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│   workflow   │──▶│    store     │   │
//!                     │  │ server  │   │   executor   │   │ (cache+file) │   │
//!                     │  └─────────┘   └──────┬───────┘   └──────────────┘   │
//!                     │                       │                               │
//!                     │                       ▼                               │
//!                     │               ┌──────────────┐                        │
//!                     │               │  transform   │                        │
//!                     │               └──────┬───────┘                        │
//!                     │                       ▼                               │
//!   Client Response   │  ┌─────────┐   ┌──────────────┐                        │
//!   ◀─────────────────┼──│response │◀──│   invoker    │◀───────────────────────┼──── Tenant
//!                     │  │ render  │   │ + normalize  │                        │     Upstream
//!                     │  └─────────┘   └──────────────┘                        │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tenant_proxy::config::loader::load_config;
use tenant_proxy::lifecycle::signals::forward_signals;
use tenant_proxy::observability::{logging, metrics};
use tenant_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "tenant-proxy")]
#[command(about = "Config-driven multi-tenant HTTP proxy", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "tenant-proxy.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    logging::init_logging(&config.observability)?;

    tracing::info!("tenant-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        deadline_ms = config.workflow.deadline_ms,
        invoke_timeout_ms = config.workflow.invoke_timeout_ms,
        "Configuration loaded"
    );

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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    forward_signals(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
