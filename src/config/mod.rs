//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `YOGA` prefix and `__`
//! between nested keys.
//!
//! `database` and `redis` are optional: without them the service runs on
//! in-memory repositories and the in-process event bus.
//!
//! # Example
//!
//! ```no_run
//! use yoga_sessions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod rate_limit;
mod redis;
mod server;
mod storage;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use rate_limit::RateLimitSettings;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; in-memory stores when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Redis Streams bus; in-process bus when absent
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Bearer token validation
    pub auth: AuthConfig,

    /// Photo blob storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-route request throttling
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `YOGA` prefix, `__` separating nested keys
    ///
    /// - `YOGA__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `YOGA__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("YOGA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.auth.validate(&self.server.environment)?;
        self.storage.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
