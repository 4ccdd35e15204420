//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Redis command timeout must be at least 1ms")]
    InvalidCommandTimeout,

    #[error("Redis command timeout ({command_ms}ms) must be shorter than the lock lease ({lease_ms}ms)")]
    CommandTimeoutExceedsLease { command_ms: u64, lease_ms: u64 },

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Seed rule capacity must be at least 1")]
    InvalidSeedCapacity,

    #[error("Invalid seed time unit: {0}")]
    InvalidSeedTimeUnit(String),

    #[error("Key prefix '{0}' must not be empty")]
    EmptyKeyPrefix(&'static str),

    #[error("Cache and lock prefixes must differ")]
    PrefixCollision,

    #[error("Lock lease ({lease_ms}ms) must exceed the lock wait ({wait_ms}ms)")]
    LeaseShorterThanWait { lease_ms: u64, wait_ms: u64 },
}
