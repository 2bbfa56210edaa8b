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

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Invalid token header name: {0}")]
    InvalidHeaderName(String),

    #[error("Purge interval must be at least one second")]
    InvalidPurgeInterval,

    #[error("Relocation TTL exceeds one week")]
    InvalidRelocationTtl,

    #[error("Redirecting new requests requires a parent host")]
    RedirectWithoutParent,
}
