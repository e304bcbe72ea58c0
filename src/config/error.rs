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
    InvalidAddress(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Slot namespace must not be empty")]
    EmptyNamespace,

    #[error("Sync debounce must be between 1ms and 60000ms")]
    InvalidDebounce,

    #[error("Sync endpoint must be an http(s) URL")]
    InvalidSyncEndpoint,
}
