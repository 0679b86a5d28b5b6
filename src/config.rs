//! Configuration management for Duckie.
//!
//! Handles loading configuration from TOML files, with CLI flags and
//! environment variables layered on top by [`crate::cli`].

use crate::db::DataSources;
use crate::error::{DuckieError, Result};
use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Duckie.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// DuckDB engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Allow-listed data sources.
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Resolves host and port into a socket address.
    ///
    /// `host` may be an IP literal or a hostname such as `localhost`; the
    /// first resolved address is used.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(DuckieError::config("server.host must not be empty"));
        }

        let invalid = |reason: String| {
            DuckieError::config(format!(
                "Invalid listen address {}:{}: {reason}",
                host, self.port
            ))
        };
        (host, self.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }
}

/// DuckDB engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory the engine resolves data source file names against.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// DuckDB worker threads per connection.
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Maximum number of engine connections open at once.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// How long a request waits for a free connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Maximum time a single query may run.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_threads() -> u32 {
    4
}

fn default_max_connections() -> usize {
    8
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_query_timeout_secs() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            threads: default_threads(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

impl EngineConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Allow-listed data sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_allowed_sources")]
    pub allowed: Vec<String>,
}

fn default_allowed_sources() -> Vec<String> {
    vec!["call_center.csv".to_string(), "catalog_page.csv".to_string()]
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed_sources(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("duckie")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DuckieError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DuckieError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Checks invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.sources.allowed.iter().all(|s| s.trim().is_empty()) {
            return Err(DuckieError::config("sources.allowed must not be empty"));
        }
        if self.engine.threads == 0 {
            return Err(DuckieError::config("engine.threads must be at least 1"));
        }
        if self.engine.max_connections == 0 {
            return Err(DuckieError::config(
                "engine.max_connections must be at least 1",
            ));
        }
        if self.engine.query_timeout_secs == 0 {
            return Err(DuckieError::config(
                "engine.query_timeout_secs must be at least 1",
            ));
        }
        self.server.socket_addr()?;
        Ok(())
    }

    /// Builds the allow-list from the configured names.
    pub fn data_sources(&self) -> DataSources {
        DataSources::new(
            self.sources
                .allowed
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
        )
    }
}
