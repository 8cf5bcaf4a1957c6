//! Siphon Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use siphon_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[server]\nport = 1514").unwrap();
//! assert_eq!(config.server.port, 1514);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [server]
//! port = 514
//! console_output = true
//! log_file = "siphon.log"
//!
//! [log]
//! level = "info"
//!
//! [filter]
//! enabled = true
//! allowed_sources = ["10.0.0.0/8", "192.168.1.5"]
//! min_severity = 4
//! exclude_substrings = ["DEBUG"]
//! ```
//!
//! See `configs/siphon.toml` for a commented example.

mod error;
mod filter;
mod logging;
mod server;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use error::{ConfigError, Result};
pub use filter::FilterSettings;
pub use logging::{LogConfig, LogLevel};
pub use server::ServerConfig;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener and output settings
    pub server: ServerConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Message filter settings
    pub filter: FilterSettings,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            server: ServerConfig::default(),
            log: LogConfig::default(),
            filter: FilterSettings::default(),
        };
        config.normalize();
        config
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.normalize();
        Ok(config)
    }

    /// Apply defaulting rules that depend on other fields.
    fn normalize(&mut self) {
        self.server.normalize();
        self.filter.normalize();
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
