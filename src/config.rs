//! Panel configuration file.
//!
//! YAML with the backend server list and the HTTP bind address. A missing
//! file falls back to defaults so the panel can come up empty and have
//! servers added later.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use relaypanel_grants::ServerInfo;

/// Top-level panel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Address the API server binds
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    /// Allow cross-origin requests from localhost dev servers
    #[serde(default = "default_true")]
    pub enable_cors: bool,
    /// Index of the active server in `servers`
    #[serde(default)]
    pub current_server: usize,
    /// Known backend servers
    #[serde(default)]
    pub servers: Vec<ServerInfo>,
}

fn default_bind() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

fn default_true() -> bool {
    true
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            enable_cors: true,
            current_server: 0,
            servers: Vec::new(),
        }
    }
}

impl PanelConfig {
    /// Parse configuration from YAML text
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: PanelConfig =
            serde_yaml::from_str(yaml).context("Failed to parse panel config")?;
        if !config.servers.is_empty() && config.current_server >= config.servers.len() {
            anyhow::bail!(
                "current_server {} is out of range for {} servers",
                config.current_server,
                config.servers.len()
            );
        }
        Ok(config)
    }

    /// Load configuration from a file, defaulting when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::parse(&yaml)
    }
}
