//! Store Admin Configuration System
//!
//! TOML-based configuration with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub access: AccessConfig,

    /// Seed fixture stores, users and memberships on startup
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            access: AccessConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "storeadmin".to_string(),
        }
    }
}

/// Membership storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mongodb,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::ValidationError(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Mongodb }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider
    pub jwt_secret: String,
    pub issuer: String,
    pub audience: String,
    /// Where unauthenticated requests are redirected
    pub sign_in_url: String,
    pub session_cookie: String,
    /// Lifetime of tokens issued for dev fixtures
    pub dev_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: "storeadmin".to_string(),
            audience: "storeadmin-console".to_string(),
            sign_in_url: "/handler/login".to_string(),
            session_cookie: "sa_session".to_string(),
            dev_token_expiry_secs: 28800, // 8 hours
        }
    }
}

/// Access control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Upper bound for each store-list or role lookup
    pub lookup_timeout_ms: u64,
    /// Contexts unused for this long are dropped
    pub session_idle_secs: u64,
    /// How often idle contexts are swept
    pub session_sweep_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: 10_000,
            session_idle_secs: 1800,
            session_sweep_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Reject combinations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must be set outside dev mode".to_string(),
            ));
        }
        if self.access.lookup_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "access.lookup_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.access.session_idle_secs == 0 || self.access.session_sweep_secs == 0 {
            return Err(ConfigError::ValidationError(
                "access.session_idle_secs and access.session_sweep_secs must be greater than zero".to_string(),
            ));
        }
        if !self.auth.sign_in_url.starts_with('/') && !self.auth.sign_in_url.starts_with("http") {
            return Err(ConfigError::ValidationError(format!(
                "auth.sign_in_url must be a path or absolute URL: {}",
                self.auth.sign_in_url
            )));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Store Admin Configuration
# Environment variables (STOREADMIN_*) override these settings

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[mongodb]
uri = "mongodb://localhost:27017"
database = "storeadmin"

[storage]
backend = "mongodb"  # mongodb or memory

[auth]
jwt_secret = ""
issuer = "storeadmin"
audience = "storeadmin-console"
sign_in_url = "/handler/login"
session_cookie = "sa_session"
dev_token_expiry_secs = 28800

[access]
lookup_timeout_ms = 10000
session_idle_secs = 1800
session_sweep_secs = 60

dev_mode = false
"#
        .to_string()
    }
}
