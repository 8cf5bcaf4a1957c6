//! Server configuration
//!
//! Listener address/port shared by both transports, and output selection.

use std::path::PathBuf;

use serde::Deserialize;

/// Default listen port (the syslog port; privileged, may need root)
const DEFAULT_PORT: u16 = 514;

/// Default maximum TCP line length (8KB); 0 disables the bound
const DEFAULT_MAX_MESSAGE_SIZE: usize = 8192;

/// Server configuration
///
/// # Example
///
/// ```toml
/// [server]
/// port = 514
/// console_output = true
/// log_file = "siphon.log"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for both listeners
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port shared by the TCP and UDP listeners
    /// Default: 514 (0 also falls back to 514)
    pub port: u16,

    /// Write accepted records to stdout
    /// Forced on when no log file is configured either
    pub console_output: bool,

    /// Append accepted records to this file
    pub log_file: Option<PathBuf>,

    /// Maximum TCP line length in bytes; longer lines are dropped whole.
    /// 0 removes the bound (an unterminated line can then grow the read
    /// buffer without limit).
    /// Default: 8192
    pub max_message_size: usize,

    /// Maximum simultaneous TCP connections
    /// Default: 0 (unlimited)
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            console_output: false,
            log_file: None,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_connections: 0,
        }
    }
}

impl ServerConfig {
    /// At least one output must stay enabled.
    pub(crate) fn normalize(&mut self) {
        if self.port == 0 {
            self.port = DEFAULT_PORT;
        }
        if !self.console_output && self.log_file.is_none() {
            self.console_output = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.port, 514);
        assert!(!config.console_output);
        assert!(config.log_file.is_none());
        assert_eq!(config.max_message_size, 8192);
        assert_eq!(config.max_connections, 0);
    }

    #[test]
    fn test_zero_port_falls_back() {
        let mut config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        config.normalize();
        assert_eq!(config.port, 514);
    }

    #[test]
    fn test_console_forced_on_without_outputs() {
        let mut config = ServerConfig::default();
        config.normalize();
        assert!(config.console_output);
    }

    #[test]
    fn test_console_stays_off_with_log_file() {
        let mut config = ServerConfig {
            console_output: false,
            log_file: Some("out.log".into()),
            ..Default::default()
        };
        config.normalize();
        assert!(!config.console_output);
    }

    #[test]
    fn test_deserialize() {
        let config: ServerConfig = toml::from_str(
            r#"
port = 1514
log_file = "logs/siphon.log"
"#,
        )
        .unwrap();
        assert_eq!(config.port, 1514);
        assert_eq!(config.log_file, Some(PathBuf::from("logs/siphon.log")));
    }
}
