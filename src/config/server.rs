//! Listener and logging configuration for the gateway process

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;

/// Upper bound on `request_timeout_secs`
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// How the gateway listens and logs
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// IP address the listener binds to, v4 or v6
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// `tracing` filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Per-request timeout in seconds, applied around the admission handler
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Address the listener binds to.
    ///
    /// Only literal IP addresses are accepted; name resolution is left to
    /// whoever fronts the gateway.
    pub fn listen_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .bind_address
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(self.bind_address.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate listener and logging settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if EnvFilter::try_new(&self.log_level).is_err() {
            return Err(ValidationError::InvalidLogFilter(self.log_level.clone()));
        }
        self.listen_addr()?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
            log_json: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,ermes_gateway=debug,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_every_ipv4_interface() {
        let config = ServerConfig::default();

        assert_eq!(config.listen_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn ipv6_bind_address_is_accepted() {
        let config = ServerConfig {
            bind_address: "::1".to_string(),
            port: 9000,
            ..Default::default()
        };

        assert_eq!(config.listen_addr().unwrap().to_string(), "[::1]:9000");
    }

    #[test]
    fn hostname_is_not_a_bind_address() {
        let config = ServerConfig {
            bind_address: "gateway.local".to_string(),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidBindAddress("gateway.local".to_string()))
        );
    }

    #[test]
    fn port_zero_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };

        assert_eq!(config.validate(), Err(ValidationError::InvalidPort));
    }

    #[test]
    fn timeout_must_be_within_bounds() {
        for secs in [0, MAX_REQUEST_TIMEOUT_SECS + 1] {
            let config = ServerConfig {
                request_timeout_secs: secs,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
        }

        let config = ServerConfig {
            request_timeout_secs: MAX_REQUEST_TIMEOUT_SECS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unparseable_log_filter_is_rejected() {
        let config = ServerConfig {
            log_level: "ermes_gateway=loud".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLogFilter(_))
        ));
    }
}
