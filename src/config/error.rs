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
#[derive(Debug, Error, PartialEq, Eq)]
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

    #[error("Redis batch size must be between 1 and 1000")]
    InvalidBatchSize,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("JWT secret must be at least 32 bytes in production")]
    WeakJwtSecret,

    #[error("Invalid storage folder: {0}")]
    InvalidStorageFolder(String),

    #[error("Max file size must be between 1 byte and 50 MiB")]
    InvalidMaxFileSize,

    #[error("Rate limit for {0} needs a positive limit and window")]
    InvalidRateLimit(&'static str),
}
