//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = ConfigError::Io {
            path: "configs/siphon.toml".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("configs/siphon.toml"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = "port = ".parse::<toml::Table>().unwrap_err();
        let err = ConfigError::Parse(err);
        assert!(err.to_string().contains("failed to parse config"));
    }
}
