//! Relay Panel - access-grant administration for a reverse-proxy fleet
//!
//! Serves the grant management REST API the admin console talks to.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relaypanel_api::{store::GrantStore, ApiServer, ApiServerConfig};

use config::PanelConfig;

/// Relay Panel - manage proxy-user access grants
#[derive(Parser, Debug)]
#[command(name = "relaypanel")]
#[command(about = "Relay Panel - manage proxy-user access grants")]
#[command(version)]
struct Cli {
    /// Path to the panel configuration file
    #[arg(short, long, env = "RELAYPANEL_CONFIG", default_value = "relaypanel.yaml")]
    config: PathBuf,

    /// Override the bind address from the config file
    #[arg(long, env = "RELAYPANEL_BIND")]
    bind: Option<SocketAddr>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    info!(
        "relaypanel {} ({}, built {})",
        env!("GIT_TAG"),
        env!("GIT_HASH"),
        env!("BUILD_TIME")
    );

    let config = PanelConfig::load(&cli.config)?;
    if config.servers.is_empty() {
        warn!(
            "no backend servers configured in {:?}; grants can be created but exports will fall back to the panel address",
            cli.config
        );
    }

    let api_config = ApiServerConfig {
        bind_addr: cli.bind.unwrap_or(config.bind),
        enable_cors: config.enable_cors,
    };

    let server = ApiServer::new(
        api_config,
        GrantStore::new(),
        config.servers,
        config.current_server,
    );

    server.start().await
}
