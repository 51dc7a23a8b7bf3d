//! ollama-proxy
//!
//! ```text
//!   Browser ──▶ ┌──────────────────────────────┐ ──▶ Ollama
//!               │ preflight? answer here        │
//!               │ read body, clean `images`     │
//!               │ forward method/path/headers   │
//!   Browser ◀── │ relay status/headers/body     │ ◀── Ollama
//!               │ + Access-Control-* headers    │
//!               └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use ollama_proxy::config::{load_config, Overrides};
use ollama_proxy::lifecycle::signals::spawn_signal_listener;
use ollama_proxy::observability::{logging, metrics};
use ollama_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "ollama-proxy")]
#[command(about = "CORS-enabling reverse proxy for a local Ollama server", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file).
    #[arg(short, long)]
    bind: Option<String>,

    /// Upstream base URL (overrides OLLAMA_URL and the config file).
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = Overrides {
        bind_address: cli.bind,
        upstream_url: cli.upstream,
    };
    let config = load_config(cli.config.as_deref(), &overrides)?;

    logging::init(&config.observability);

    tracing::info!("ollama-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        normalize_images = config.payload.normalize_images,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                bind_address = %config.listener.bind_address,
                error = %e,
                "Failed to bind listener"
            );
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    spawn_signal_listener(shutdown);

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
