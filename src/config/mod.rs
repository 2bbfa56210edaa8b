//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ERMES` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use ermes_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Node {} listening on port {}", config.node.host, config.server.port);
//! ```

mod admission;
mod error;
mod node;
mod server;

pub use admission::AdmissionConfig;
pub use error::{ConfigError, ValidationError};
pub use node::NodeConfig;
pub use server::{ServerConfig, MAX_REQUEST_TIMEOUT_SECS};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Identity of this node
    pub node: NodeConfig,

    /// Admission policies
    #[serde(default)]
    pub admission: AdmissionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ERMES` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ERMES__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ERMES__SERVER__BIND_ADDRESS=::` -> `server.bind_address = ::`
    /// - `ERMES__NODE__HOST=http://a.local` -> `node.host = http://a.local`
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
                config::Environment::with_prefix("ERMES")
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
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.node.validate()?;
        self.admission.validate(&self.node)?;
        Ok(())
    }
}
