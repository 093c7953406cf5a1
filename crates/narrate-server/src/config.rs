//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub kv: KvConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Admin account seeded into an empty account store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin without credentials
    #[serde(default)]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Key-value store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    Redis,
    Memory,
}

/// Key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvConfig {
    #[serde(default = "default_kv_backend")]
    pub backend: KvBackend,
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            backend: default_kv_backend(),
            url: default_redis_url(),
        }
    }
}

/// Minimum session lifetime (1 hour)
const MIN_SESSION_TTL_HOURS: u64 = 1;

/// Maximum session lifetime (30 days)
const MAX_SESSION_TTL_HOURS: u64 = 720;

/// Minimum access token lifetime (1 hour)
const MIN_TOKEN_EXPIRY_HOURS: i64 = 1;

/// Maximum access token lifetime (30 days)
const MAX_TOKEN_EXPIRY_HOURS: i64 = 720;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of an access token
    ///
    /// Valid range: 1-720 hours. Default: 24 hours
    #[serde(default = "default_token_expiry_hours")]
    pub token_expiry_hours: i64,
    /// Lifetime of a login session
    ///
    /// Valid range: 1-720 hours. Default: 24 hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    /// Return OTP codes in API responses (development only)
    #[serde(default)]
    pub expose_otp: bool,
}

impl AuthConfig {
    /// Session lifetime clamped to [1, 720] hours, with a warning if adjusted
    pub fn validated_session_ttl(&self) -> Duration {
        let hours = if self.session_ttl_hours < MIN_SESSION_TTL_HOURS {
            warn!(
                "session_ttl_hours {} is below minimum {}, using minimum",
                self.session_ttl_hours, MIN_SESSION_TTL_HOURS
            );
            MIN_SESSION_TTL_HOURS
        } else if self.session_ttl_hours > MAX_SESSION_TTL_HOURS {
            warn!(
                "session_ttl_hours {} exceeds maximum {}, using maximum",
                self.session_ttl_hours, MAX_SESSION_TTL_HOURS
            );
            MAX_SESSION_TTL_HOURS
        } else {
            self.session_ttl_hours
        };

        Duration::from_secs(hours * 3600)
    }

    /// Token lifetime in hours clamped to [1, 720], with a warning if adjusted
    pub fn validated_token_expiry_hours(&self) -> i64 {
        if self.token_expiry_hours < MIN_TOKEN_EXPIRY_HOURS {
            warn!(
                "token_expiry_hours {} is below minimum {}, using minimum",
                self.token_expiry_hours, MIN_TOKEN_EXPIRY_HOURS
            );
            MIN_TOKEN_EXPIRY_HOURS
        } else if self.token_expiry_hours > MAX_TOKEN_EXPIRY_HOURS {
            warn!(
                "token_expiry_hours {} exceeds maximum {}, using maximum",
                self.token_expiry_hours, MAX_TOKEN_EXPIRY_HOURS
            );
            MAX_TOKEN_EXPIRY_HOURS
        } else {
            self.token_expiry_hours
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_expiry_hours: default_token_expiry_hours(),
            session_ttl_hours: default_session_ttl_hours(),
            expose_otp: false,
        }
    }
}

/// Outbound notifier backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierBackend {
    Log,
    Whatsapp,
}

/// Outbound notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_backend")]
    pub backend: NotifierBackend,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: default_notifier_backend(),
            api_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_notifier_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

/// Bootstrap admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdminConfig {
    pub full_name: String,
    pub phone_number: String,
    pub password: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_db_path() -> String {
    "./data/narrate.db".to_string()
}

fn default_kv_backend() -> KvBackend {
    KvBackend::Redis
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_expiry_hours() -> i64 {
    24
}

fn default_session_ttl_hours() -> u64 {
    24
}

fn default_notifier_backend() -> NotifierBackend {
    NotifierBackend::Log
}

fn default_notifier_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.kv.backend, KvBackend::Redis);
        assert_eq!(config.notifier.backend, NotifierBackend::Log);
        assert_eq!(config.auth.token_expiry_hours, 24);
        assert!(!config.auth.expose_otp);
        assert!(config.auth.uses_default_secret());
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.auth.validated_session_ttl(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.database.path, "./data/narrate.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"
            [server]
            port = 9000
            cors_origins = ["https://narrate.example"]

            [kv]
            backend = "memory"

            [auth]
            jwt_secret = "s3cret"
            session_ttl_hours = 48
            expose_otp = true

            [notifier]
            backend = "whatsapp"
            api_url = "https://gateway.example/send"
            api_key = "key"

            [bootstrap_admin]
            full_name = "Root"
            phone_number = "+15550009"
            password = "rootpw"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(config.kv.backend, KvBackend::Memory);
        assert!(!config.auth.uses_default_secret());
        assert!(config.auth.expose_otp);
        assert_eq!(config.auth.validated_session_ttl(), Duration::from_secs(48 * 3600));
        assert_eq!(config.notifier.backend, NotifierBackend::Whatsapp);
        assert_eq!(config.bootstrap_admin.unwrap().phone_number, "+15550009");
    }

    #[test]
    fn test_session_ttl_clamped() {
        let mut auth = AuthConfig {
            session_ttl_hours: 0,
            ..AuthConfig::default()
        };
        assert_eq!(auth.validated_session_ttl(), Duration::from_secs(3600));

        auth.session_ttl_hours = 10_000;
        assert_eq!(auth.validated_session_ttl(), Duration::from_secs(720 * 3600));
    }

    #[test]
    fn test_token_expiry_clamped() {
        let mut auth = AuthConfig {
            token_expiry_hours: -5,
            ..AuthConfig::default()
        };
        assert_eq!(auth.validated_token_expiry_hours(), 1);

        auth.token_expiry_hours = i64::MAX;
        assert_eq!(auth.validated_token_expiry_hours(), 720);

        auth.token_expiry_hours = 48;
        assert_eq!(auth.validated_token_expiry_hours(), 48);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Config::parse("[kv]\nbackend = \"etcd\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/narrate.toml").unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
