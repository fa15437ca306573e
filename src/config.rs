//! Gateway configuration loaded once at startup.
//!
//! Every field has a default, so an empty TOML file is a valid configuration.
//! A handful of deployment-specific values can be overridden from the
//! environment after the file is read.

use crate::{registry::domain::DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER, upstream::adapters::HttpUpstreamSettings};
use serde::Deserialize;
use std::{fmt, path::Path, time::Duration};
use thiserror::Error;

/// Overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "TOOLGATE_DATABASE_URL";
/// Overrides `security.vault_key_hex`.
pub const VAULT_KEY_ENV: &str = "TOOLGATE_VAULT_KEY";
/// Overrides `server.bind_address`.
pub const BIND_ADDRESS_ENV: &str = "TOOLGATE_BIND_ADDRESS";
/// Overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "TOOLGATE_LOG_LEVEL";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Listener and path layout.
    pub server: ServerConfig,
    /// Registry database.
    pub database: DatabaseConfig,
    /// Credential vault.
    pub security: SecurityConfig,
    /// Outbound MCP client.
    pub upstream: UpstreamConfig,
    /// Tracing output.
    pub logging: LoggingConfig,
    /// Virtual server limits.
    pub composer: ComposerConfig,
}

impl GatewayConfig {
    /// Reads `path`, applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or a
    /// value is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text without environment overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed text or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replaces values for which `lookup` returns a non-empty string.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(url) = read(DATABASE_URL_ENV) {
            self.database.url = url;
        }
        if let Some(key) = read(VAULT_KEY_ENV) {
            self.security.vault_key_hex = Some(key);
        }
        if let Some(address) = read(BIND_ADDRESS_ENV) {
            self.server.bind_address = address;
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| Err(ConfigError::Invalid(message.to_owned()));
        if self.database.url.trim().is_empty() {
            return invalid("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            return invalid("database.max_connections must be positive");
        }
        if self.upstream.request_timeout_secs == 0 || self.upstream.call_timeout_secs == 0 {
            return invalid("upstream timeouts must be positive");
        }
        if self.composer.max_tools_per_virtual_server == 0 {
            return invalid("composer.max_tools_per_virtual_server must be positive");
        }
        if !is_nested_prefix(&self.server.admin_prefix) {
            return invalid("server.admin_prefix must start with '/' and name a path");
        }
        if !is_nested_prefix(&self.server.mcp_path_prefix) {
            return invalid("server.mcp_path_prefix must start with '/' and name a path");
        }
        Ok(())
    }
}

fn is_nested_prefix(prefix: &str) -> bool {
    prefix.starts_with('/') && prefix.trim_end_matches('/').len() > 1
}

/// Listener and path layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_address: String,
    /// Prefix of the per-virtual-server MCP endpoints.
    pub mcp_path_prefix: String,
    /// Prefix of the administrative API.
    pub admin_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_owned(),
            mcp_path_prefix: "/servers".to_owned(),
            admin_prefix: "/api".to_owned(),
        }
    }
}

/// Registry database.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/toolgate".to_owned(),
            max_connections: 10,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Connection URLs may embed a password.
        f.debug_struct("DatabaseConfig")
            .field("url_len", &self.url.len())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Credential vault.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Hex-encoded AES key; credentials are stored in cleartext without one.
    pub vault_key_hex: Option<String>,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("vault_key_configured", &self.vault_key_hex.is_some())
            .finish()
    }
}

/// Outbound MCP client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Budget for each HTTP request to an upstream.
    pub request_timeout_secs: u64,
    /// Budget for a whole proxied tool call including the handshake.
    pub call_timeout_secs: u64,
    /// Client name announced during `initialize`.
    pub client_name: String,
    /// Client version announced during `initialize`.
    pub client_version: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let http = HttpUpstreamSettings::default();
        Self {
            request_timeout_secs: http.request_timeout.as_secs(),
            call_timeout_secs: 120,
            client_name: http.client_name,
            client_version: http.client_version,
        }
    }
}

impl UpstreamConfig {
    /// Budget for a whole proxied tool call.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Settings for the streamable-HTTP connector.
    #[must_use]
    pub fn http_settings(&self) -> HttpUpstreamSettings {
        HttpUpstreamSettings {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            client_name: self.client_name.clone(),
            client_version: self.client_version.clone(),
        }
    }
}

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Tracing output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// Virtual server limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposerConfig {
    /// Most tools one virtual server may hold.
    pub max_tools_per_virtual_server: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_tools_per_virtual_server: DEFAULT_MAX_TOOLS_PER_VIRTUAL_SERVER,
        }
    }
}
