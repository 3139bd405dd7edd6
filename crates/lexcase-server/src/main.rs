//! LexCase server binary
//!
//! Starts the HTTP server for document analysis and the legal assistant.

use clap::Parser;
use lexcase_server::{config::ServerConfig, start_server, ServerError};
use std::path::PathBuf;
use std::process;
use tracing::warn;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "lexcase-server")]
#[command(about = "Legal document analysis and assistant HTTP service")]
#[command(version)]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(short, long, env = "LEXCASE_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address from the config file
    #[arg(long)]
    bind_address: Option<String>,

    /// Override the bind port from the config file
    #[arg(short = 'p', long)]
    bind_port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            warn!("No config file specified, using defaults");
            ServerConfig::default_test_config()
        }
    };

    if let Some(address) = cli.bind_address {
        config.bind_address = address;
    }
    if let Some(port) = cli.bind_port {
        config.bind_port = port;
    }

    start_server(config).await
}
