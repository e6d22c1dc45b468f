//! suitelink gateway
//!
//! Serves the connector operations to the integration platform:
//!
//!   suitelink-gateway --config connector.json --port 4080
//!
//! Each call is stateless; resume state travels in the caller's
//! `pagingContext`.

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use suitelink_connector::{Connector, ConnectorConfig};
use suitelink_gateway::build_router;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "suitelink-gateway")]
#[command(about = "HTTP gateway for the suitelink ERP connector")]
struct Args {
    /// Path to a JSON connector configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(short, long, default_value = "4080")]
    port: u16,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<ConnectorConfig> {
    let Some(path) = path else {
        info!("No config file given, using defaults");
        return Ok(ConnectorConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = ConnectorConfig::from_json(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("suitelink gateway starting...");
    let config = load_config(args.config.as_ref())?;
    let remote = config.api_base_url.clone();
    let connector = Connector::from_config(config).context("Failed to create connector")?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", args.port))?;
    info!("Listening on port {}, remote {}", args.port, remote);

    axum::serve(listener, build_router(Arc::new(connector)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await
        .context("HTTP server failed")?;
    Ok(())
}
