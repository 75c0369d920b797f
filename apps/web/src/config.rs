//! Server configuration module.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! 1. built-in defaults (suitable for local development)
//! 2. `carhire.toml` in the working directory, if present
//! 3. `CARHIRE_*` environment variables, e.g. `CARHIRE_PORT=9000`

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "carhire-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub max_connections: u32,

    /// HMAC secret for session tokens
    pub session_secret: String,

    /// Session lifetime in seconds
    pub session_lifetime_secs: i64,

    /// Session lifetime in seconds when "remember me" is ticked
    pub remember_lifetime_secs: i64,

    /// Admin account created at startup if missing
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,

    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: "carhire.db".to_string(),
            max_connections: 5,
            session_secret: DEFAULT_SECRET.to_string(),
            session_lifetime_secs: 86_400,     // 1 day
            remember_lifetime_secs: 2_592_000, // 30 days
            admin_username: "admin".to_string(),
            admin_email: "admin@carhire.local".to_string(),
            admin_password: "admin123".to_string(),
            log_filter: "carhire_web=info,carhire_db=info,tower_http=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, `carhire.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let settings = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.database_path)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("session_secret", defaults.session_secret)?
            .set_default("session_lifetime_secs", defaults.session_lifetime_secs)?
            .set_default("remember_lifetime_secs", defaults.remember_lifetime_secs)?
            .set_default("admin_username", defaults.admin_username)?
            .set_default("admin_email", defaults.admin_email)?
            .set_default("admin_password", defaults.admin_password)?
            .set_default("log_filter", defaults.log_filter)?
            .add_source(File::with_name("carhire").required(false))
            .add_source(Environment::with_prefix("CARHIRE").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("session_secret".to_string()));
        }
        if self.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("session_lifetime_secs".to_string()));
        }
        if self.remember_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("remember_lifetime_secs".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        Ok(())
    }

    /// True while the built-in development secret signs sessions.
    pub fn uses_dev_secret(&self) -> bool {
        self.session_secret == DEFAULT_SECRET
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
