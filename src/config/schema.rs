//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from a TOML file, and
//! every section defaults to something usable so a bare `webdraw` invocation
//! works out of the box.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the drawing server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, admission limits, timeouts).
    pub listener: ListenerConfig,

    /// Session registry settings.
    pub session: SessionConfig,

    /// Static asset locations.
    pub statics: StaticConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address, without the port (e.g., "0.0.0.0").
    pub bind_address: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum concurrent connections (admission backpressure).
    pub max_connections: usize,

    /// Seconds a connection may sit idle mid-request before being dropped.
    pub read_timeout_secs: u64,

    /// Capacity of the per-connection request buffer. A request whose
    /// headers do not fit is aborted without a response.
    pub request_buffer_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8013,
            max_connections: 1024,
            read_timeout_secs: 60,
            request_buffer_bytes: 16384,
        }
    }
}

/// Session registry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds of inactivity after which a session (and its canvas) is
    /// discarded by the sweep.
    pub idle_expiry_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_expiry_secs: 300,
        }
    }
}

/// Locations of the served static assets and the canvas template.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory holding page.html, page-test.html and blank.png.
    pub dir: PathBuf,

    /// PNG template every new canvas starts from.
    pub template: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static"),
            template: PathBuf::from("static/blank.png"),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Full socket address string ("host:port") for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_serviceable() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.port, 8013);
        assert_eq!(config.session.idle_expiry_secs, 300);
        assert_eq!(config.listener.request_buffer_bytes, 16384);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9000

            [session]
            idle_expiry_secs = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 9000);
        assert_eq!(config.listener.bind_address, "0.0.0.0");
        assert_eq!(config.session.idle_expiry_secs, 10);
        assert_eq!(config.statics.dir, PathBuf::from("static"));
    }
}
