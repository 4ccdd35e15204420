//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ADMISSION` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use admission_control::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod admission;
mod database;
mod error;
mod redis;
mod server;

pub use admission::AdmissionSettings;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use self::redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Durable rule store (PostgreSQL)
    pub database: DatabaseConfig,

    /// Rule cache and distributed lock (Redis)
    pub redis: RedisConfig,

    /// Admission engine behaviour
    #[serde(default)]
    pub admission: AdmissionSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ADMISSION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ADMISSION__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ADMISSION__DATABASE__URL=...` -> `database.url = ...`
    /// - `ADMISSION__ADMISSION__AUTO_PROVISION=true` -> `admission.auto_provision = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ADMISSION")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.admission.validate()?;

        // A release or SET stalled past the lease lets another server take
        // the lock while this one still believes it holds it.
        if self.redis.command_timeout_ms >= self.admission.lock_lease_ms {
            return Err(ValidationError::CommandTimeoutExceedsLease {
                command_ms: self.redis.command_timeout_ms,
                lease_ms: self.admission.lock_lease_ms,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
