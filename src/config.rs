//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::apps::AppKind;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// App served when none is named on the command line
    #[serde(default = "default_app")]
    pub app: AppKind,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_app() -> AppKind {
    AppKind::Powers
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_request_timeout() -> u64 {
    30
}

impl ServerConfig {
    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Dataset locations; each is a local path or an http(s) URL
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_agriculture_csv")]
    pub agriculture_csv: String,

    #[serde(default = "default_gapminder_csv")]
    pub gapminder_csv: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_agriculture_csv() -> String {
    "https://gist.githubusercontent.com/chriddyp/c78bf172206ce24f77d6363a2d754b59/raw/c353e8ef842413cae56ae3920b8fd78468aa4cb2/usa-agricultural-exports-2011.csv".to_string()
}

fn default_gapminder_csv() -> String {
    "https://raw.githubusercontent.com/plotly/datasets/master/gapminderDataFiveYear.csv"
        .to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            agriculture_csv: default_agriculture_csv(),
            gapminder_csv: default_gapminder_csv(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: default_app(),
            server: ServerConfig::default(),
            data: DataConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("dashwire").join("config.toml")),
            Some(PathBuf::from("/etc/dashwire/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app) = lookup("DASHWIRE_APP") {
            match app.parse() {
                Ok(kind) => self.app = kind,
                Err(e) => tracing::warn!("Ignoring DASHWIRE_APP: {}", e),
            }
        }

        // Server overrides
        if let Some(host) = lookup("DASHWIRE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DASHWIRE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Data overrides
        if let Some(path) = lookup("DASHWIRE_AGRICULTURE_CSV") {
            self.data.agriculture_csv = path;
        }
        if let Some(path) = lookup("DASHWIRE_GAPMINDER_CSV") {
            self.data.gapminder_csv = path;
        }

        // Logging overrides
        if let Some(level) = lookup("DASHWIRE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DASHWIRE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Dashwire Configuration
#
# Environment variables override these settings:
# - DASHWIRE_APP
# - DASHWIRE_HOST
# - DASHWIRE_PORT
# - DASHWIRE_AGRICULTURE_CSV
# - DASHWIRE_GAPMINDER_CSV
# - DASHWIRE_LOG_LEVEL
# - DASHWIRE_LOG_FORMAT

# App to serve: bar-chart, agriculture, gapminder, powers
app = "powers"

[server]
# Server host
host = "127.0.0.1"

# Server port
port = 8050

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[data]
# Dataset locations: local paths or http(s) URLs
agriculture_csv = "{agriculture}"
gapminder_csv = "{gapminder}"

# Timeout for remote downloads in seconds
fetch_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        agriculture = default_agriculture_csv(),
        gapminder = default_gapminder_csv(),
    )
}
