//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.listener.max_connections == 0 {
        return Err(ConfigError::Invalid("listener.max_connections must be > 0"));
    }
    // A buffer that cannot hold even a minimal request line is useless.
    if config.listener.request_buffer_bytes < 64 {
        return Err(ConfigError::Invalid(
            "listener.request_buffer_bytes must be at least 64",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_zero_connection_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[listener]\nmax_connections = 0\n").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn loads_minimal_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[session]\nidle_expiry_secs = 5\n").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.session.idle_expiry_secs, 5);
    }
}
