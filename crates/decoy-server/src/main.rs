//! Decoy - SOAP/REST mock server
//!
//! Serves the services declared in a YAML configuration file until Ctrl-C.
//!
//! Usage:
//!   decoy --config decoy.yaml [--port 8088]

use anyhow::Context;
use clap::Parser;
use decoy_server::{shutdown_on, Config, MockServer, ServiceRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Decoy - SOAP/REST service virtualization server
#[derive(Parser, Debug)]
#[command(name = "decoy")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML service configuration
    #[arg(short, long, env = "DECOY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => {
            warn!("No configuration given, serving without any services");
            Config::default()
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let registry = Arc::new(ServiceRegistry::from_config(&config)?);
    let server = MockServer::bind(config.server.socket_addr()?, registry)
        .await
        .context("Failed to bind mock server")?;

    server.serve(shutdown_on(tokio::signal::ctrl_c())).await
}
