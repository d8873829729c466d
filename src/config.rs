//! Configuration for transports and server identity (code defaults, env overrides).

use std::env;

use serde::{Deserialize, Serialize};

/// Listener settings for the streamable-HTTP transport.
///
/// Resolution order: explicit values set in code win over `TOOLGATE_HTTP_*`
/// environment variables, which win over the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Interface to bind, default `127.0.0.1`.
    pub host: String,
    /// Port to bind, default `3000`.
    pub port: u16,
    /// Request path served, default `/mcp`.
    pub path: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            path: "/mcp".into(),
        }
    }
}

impl HttpConfig {
    /// Build a config from `TOOLGATE_HTTP_HOST` / `TOOLGATE_HTTP_PORT` /
    /// `TOOLGATE_HTTP_PATH`, falling back to defaults for unset or
    /// unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("TOOLGATE_HTTP_HOST").unwrap_or(defaults.host),
            port: env::var("TOOLGATE_HTTP_PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
            path: env::var("TOOLGATE_HTTP_PATH").unwrap_or(defaults.path),
        }
    }

    /// Socket address string in `host:port` form.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity reported by the `initialize` handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
