//! Configuration loading from file and environment variables.

use serde::Deserialize;
use thiserror::Error;
use timeline_db::DbRuntimeSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Feed store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Whether the values came from a config file rather than defaults.
    #[serde(skip)]
    pub from_file: bool,
}

/// Feed store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    /// How long an append waits for a pooled connection, in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
}

impl StoreConfig {
    /// Pool settings derived from this section.
    pub fn runtime_settings(&self) -> DbRuntimeSettings {
        DbRuntimeSettings {
            busy_timeout_ms: self.busy_timeout_ms,
            pool_max_size: self.pool_max_size,
            connection_timeout_ms: self.connection_timeout_ms,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "timeline_track=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_db_path() -> String {
    "timeline.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    DbRuntimeSettings::default().busy_timeout_ms
}

fn default_pool_max_size() -> u32 {
    DbRuntimeSettings::default().pool_max_size
}

fn default_connection_timeout_ms() -> u64 {
    DbRuntimeSettings::default().connection_timeout_ms
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
            connection_timeout_ms: default_connection_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `TIMELINE_DB_PATH` overrides `store.path`
/// - `TIMELINE_BUSY_TIMEOUT_MS` overrides `store.busy_timeout_ms`
/// - `TIMELINE_POOL_MAX_SIZE` overrides `store.pool_max_size`
/// - `TIMELINE_CONNECTION_TIMEOUT_MS` overrides `store.connection_timeout_ms`
/// - `TIMELINE_LOG_LEVEL` overrides `logging.level`
/// - `TIMELINE_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// A missing file is not an error; [`Config::from_file`] is left `false`
/// so the caller can report it once logging is set up.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => Config {
                from_file: true,
                ..toml::from_str::<Config>(&contents)?
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(path) = var("TIMELINE_DB_PATH") {
        config.store.path = path;
    }
    if let Some(parsed) = var("TIMELINE_BUSY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.store.busy_timeout_ms = parsed;
    }
    if let Some(parsed) = var("TIMELINE_POOL_MAX_SIZE").and_then(|v| v.parse().ok()) {
        config.store.pool_max_size = parsed;
    }
    if let Some(parsed) = var("TIMELINE_CONNECTION_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.store.connection_timeout_ms = parsed;
    }
    if let Some(level) = var("TIMELINE_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("TIMELINE_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
