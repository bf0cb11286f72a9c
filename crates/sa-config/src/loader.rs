//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "storeadmin.toml",
    "./config/config.toml",
    "./config/storeadmin.toml",
    "/etc/storeadmin/config.toml",
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

        apply_overrides(&mut config, |key| env::var(key).ok());

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured file not found, searching standard paths");
        }

        if let Ok(path) = env::var("STOREADMIN_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `STOREADMIN_*` overrides using the given variable lookup
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("STOREADMIN_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("STOREADMIN_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("STOREADMIN_CORS_ORIGINS") {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // MongoDB
    if let Some(val) = lookup("STOREADMIN_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("STOREADMIN_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Storage
    if let Some(val) = lookup("STOREADMIN_STORAGE_BACKEND") {
        match val.parse() {
            Ok(backend) => config.storage.backend = backend,
            Err(e) => warn!(error = %e, "Ignoring STOREADMIN_STORAGE_BACKEND"),
        }
    }

    // Auth
    if let Some(val) = lookup("STOREADMIN_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("STOREADMIN_JWT_ISSUER") {
        config.auth.issuer = val;
    }
    if let Some(val) = lookup("STOREADMIN_JWT_AUDIENCE") {
        config.auth.audience = val;
    }
    if let Some(val) = lookup("STOREADMIN_SIGN_IN_URL") {
        config.auth.sign_in_url = val;
    }
    if let Some(val) = lookup("STOREADMIN_SESSION_COOKIE") {
        config.auth.session_cookie = val;
    }

    // Access
    if let Some(timeout) = lookup("STOREADMIN_LOOKUP_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.access.lookup_timeout_ms = timeout;
    }
    if let Some(secs) = lookup("STOREADMIN_SESSION_IDLE_SECS").and_then(|v| v.parse().ok()) {
        config.access.session_idle_secs = secs;
    }

    // General
    if let Some(val) = lookup("STOREADMIN_DEV_MODE") {
        config.dev_mode = val == "true" || val == "1";
    }
}
