//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "subledger.toml",
    "./config/config.toml",
    "./config/subledger.toml",
    "/etc/subledger/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("SUBLEDGER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("SUBLEDGER_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("SUBLEDGER_HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("SUBLEDGER_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Database
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_URL") {
            config.database.url = val;
        }
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                config.database.max_connections = n;
            }
        }
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_MIN_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                config.database.min_connections = n;
            }
        }
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_ACQUIRE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                config.database.acquire_timeout_secs = n;
            }
        }
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_IDLE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                config.database.idle_timeout_secs = n;
            }
        }
        if let Ok(val) = env::var("SUBLEDGER_DATABASE_MAX_LIFETIME_SECS") {
            if let Ok(n) = val.parse() {
                config.database.max_lifetime_secs = n;
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
