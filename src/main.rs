//! admin-http
//!
//! HTTP front end for a database administration UI.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::environment ──▶ http::normalizer
//!                                                                 │
//!                                     provider::resolver ─────────┤
//!                                     (first available library)   ▼
//!     Client Response                                      CanonicalRequest
//!     ◀────────────── 200 JSON / 401 challenge / 302 ◀──── auth
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use admin_http::config::{load_config, GatewayConfig};
use admin_http::http::{GatewayServer, ServerRequestFactory};
use admin_http::observability::{logging, metrics};
use admin_http::provider::ProviderResolver;

#[derive(Parser, Debug)]
#[command(name = "admin-http", version, about = "HTTP front end for a database admin UI")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("admin-http v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        providers = %config.providers.order.join(","),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let resolved = ProviderResolver::from_names(&config.providers.order).resolve_cached()?;

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        provider = resolved.name(),
        "Listening for connections"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let server = GatewayServer::new(config, ServerRequestFactory::new(resolved.factory()));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
