//! Configuration loading and constants.
//!
//! Configuration comes from three places, later ones winning: built-in
//! defaults, an optional TOML file, and the `PORT` environment variable.
//! The `--port` command line flag is applied on top by the binary.

use std::net::{AddrParseError, IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use const_format::formatcp;
use serde::Deserialize;

// =============================================================================
// Response Bodies and Headers
// =============================================================================

/// Body served on `/`
pub const GREETING: &str = "Hello from Node.js on EKS!";

/// Body served on `/health`
pub const HEALTH_OK: &str = "OK";

/// Liveness answers must never be served from a cache
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// Listener Defaults
// =============================================================================

/// Bind on all interfaces so the pod is reachable through its Service
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Port used when neither the config file nor `PORT` provide one
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable holding the listen port
pub const PORT_ENV_VAR: &str = "PORT";

/// Time allowed for in-flight requests to finish after SIGTERM
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Logging Defaults
// =============================================================================

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = formatcp!("{}=info", env!("CARGO_CRATE_NAME"));

/// Target of the listener lifecycle lines (port announcement, shutdown)
pub const LISTENER_LOG_TARGET: &str = formatcp!("{}::listener", env!("CARGO_CRATE_NAME"));

/// Filter directive keeping listener lifecycle lines at info whatever the
/// user filter says
pub const LISTENER_LOG_DIRECTIVE: &str = formatcp!("{}=info", LISTENER_LOG_TARGET);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    /// IP address to bind (hostnames are not resolved)
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Grace period for draining connections on shutdown
    #[serde(default = "HttpServerConfig::default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            shutdown_timeout_seconds: Self::default_shutdown_timeout(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }

    fn default_shutdown_timeout() -> u64 {
        DEFAULT_SHUTDOWN_TIMEOUT_SECS
    }

    /// Socket address the listener binds to.
    ///
    /// The host is parsed as an IP address rather than glued to the port with
    /// a colon, so IPv6 hosts such as `::` work unbracketed.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for log shippers
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;

        if let Err(e) = config.http.socket_addr() {
            return Err(ConfigError::Validation(format!(
                "http.host '{}' is not an IP address: {}",
                config.http.host, e
            )));
        }

        Ok(config)
    }

    /// Load from `path` when given, otherwise start from built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply the raw value of the `PORT` environment variable.
    ///
    /// An unset variable leaves the port alone. A value that does not parse
    /// as a port is logged and ignored, so the service still comes up on the
    /// configured (or default) port.
    pub fn apply_port_env(&mut self, raw: Option<&str>) {
        let Some(raw) = raw else {
            return;
        };

        match parse_port(raw) {
            Some(port) => self.http.port = port,
            None => {
                tracing::warn!(
                    value = %raw,
                    fallback = self.http.port,
                    "Ignoring unparseable {} environment variable",
                    PORT_ENV_VAR
                );
            }
        }
    }
}

/// Parse a port number, tolerating surrounding whitespace.
pub fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
