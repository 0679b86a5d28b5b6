//! Command-line argument parsing for Duckie.
//!
//! Flags override values from the config file.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Run ad-hoc SELECT queries against CSV files from a browser.
#[derive(Parser, Debug, Default)]
#[command(name = "duckie")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "DUCKIE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short = 'H', long, value_name = "HOST", env = "DUCKIE_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, value_name = "PORT", env = "DUCKIE_PORT")]
    pub port: Option<u16>,

    /// Directory containing the data source files
    #[arg(short = 'd', long, value_name = "DIR", env = "DUCKIE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Allowed data sources, replacing the configured list (repeatable or comma-separated)
    #[arg(
        short = 's',
        long = "source",
        value_name = "NAME",
        value_delimiter = ',',
        env = "DUCKIE_SOURCES"
    )]
    pub sources: Vec<String>,

    /// Maximum number of concurrent engine connections
    #[arg(long, value_name = "N")]
    pub max_connections: Option<usize>,

    /// Maximum query run time in seconds
    #[arg(long, value_name = "SECS")]
    pub query_timeout: Option<u64>,

    /// Log level used when RUST_LOG is not set (e.g. "debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, using the default if not specified.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Applies flag overrides on top of the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(data_dir) = &self.data_dir {
            config.engine.data_dir = data_dir.clone();
        }
        if !self.sources.is_empty() {
            config.sources.allowed = self.sources.clone();
        }
        if let Some(max_connections) = self.max_connections {
            config.engine.max_connections = max_connections;
        }
        if let Some(query_timeout) = self.query_timeout {
            config.engine.query_timeout_secs = query_timeout;
        }
    }
}
