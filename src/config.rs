//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::client::HttpClientConfig;
use crate::ledger::LedgerConfig;
use crate::report::ReportConfig;
use crate::session::{default_session_path, SessionStore, DEFAULT_TTL_HOURS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
        }
    }
}

/// Operator session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,

    /// Session file; defaults to the user's local data directory
    pub path: Option<String>,
}

fn default_ttl_hours() -> i64 {
    DEFAULT_TTL_HOURS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            path: None,
        }
    }
}

impl SessionConfig {
    pub fn store(&self) -> SessionStore {
        let path = self
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path);
        SessionStore::new(path, Duration::hours(self.ttl_hours.max(1)))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
            dirs::config_dir().map(|p| p.join("numberx").join("config.toml")),
            Some(PathBuf::from("/etc/numberx/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = lookup("NUMBERX_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup("NUMBERX_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.request_timeout_secs = t;
            }
        }

        // Ledger overrides
        if let Some(size) = lookup("NUMBERX_PAGE_SIZE") {
            match size.parse() {
                Ok(s) if s > 0 => self.ledger.page_size = s,
                _ => tracing::warn!("Ignoring invalid NUMBERX_PAGE_SIZE: {}", size),
            }
        }

        // Session overrides
        if let Some(path) = lookup("NUMBERX_SESSION_FILE") {
            self.session.path = Some(path);
        }

        // Logging overrides
        if let Some(level) = lookup("NUMBERX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("NUMBERX_LOG_FORMAT") {
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
    r#"# NumberX Configuration
#
# Environment variables override these settings:
# - NUMBERX_API_URL
# - NUMBERX_REQUEST_TIMEOUT_SECS
# - NUMBERX_PAGE_SIZE
# - NUMBERX_SESSION_FILE
# - NUMBERX_LOG_LEVEL
# - NUMBERX_LOG_FORMAT

[api]
# NumberX service URL (requests go to <base_url>/api)
base_url = "http://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 30

[ledger]
# Entries fetched per page
page_size = 10

# Distance from the bottom (px) that triggers the next page
scroll_threshold = 50.0

[report]
# Rows per exported report page
rows_per_page = 25

[session]
# Hours an operator login stays valid
ttl_hours = 10

# Session file (default: <local data dir>/numberx/session.json)
# path = "/tmp/numberx-session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/numberx/numberx.log"
"#
    .to_string()
}
