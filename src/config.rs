//! Configuration module for relaychat.

use serde::Deserialize;
use std::path::Path;

use crate::{RelayError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    ///
    /// This is only a file-level default; the required CLI port argument
    /// always overrides it.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of simultaneously connected clients.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6667
}

fn default_max_clients() -> usize {
    64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_clients: default_max_clients(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Initial log level (error, warn, info, debug, or 0-3).
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(RelayError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RelayError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `RELAYCHAT_DEBUG`: Override the initial log level (name or 0-3)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("RELAYCHAT_DEBUG") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }
}
