//! Session node configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::node::DEFAULT_RELOCATION_TTL_SECS;
use crate::domain::foundation::Host;

/// Longest relocation memory accepted, one week
pub const MAX_RELOCATION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Identity of this node in the mesh
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Host this node answers for, compared against token hosts
    pub host: String,

    /// Parent node, the default target for redirected new requests
    pub parent_host: Option<String>,

    /// Seconds between sweeps for expired sessions and stale relocations
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,

    /// Seconds a relocation is remembered for requests that still carry the old token
    #[serde(default = "default_relocation_ttl")]
    pub relocation_ttl_secs: u64,
}

impl NodeConfig {
    /// This node's host as a domain value
    pub fn host(&self) -> Result<Host, ValidationError> {
        Host::new(self.host.trim()).map_err(|_| ValidationError::MissingRequired("NODE__HOST"))
    }

    /// The parent's host, if one is configured
    pub fn parent_host(&self) -> Option<Host> {
        self.parent_host
            .as_deref()
            .map(str::trim)
            .and_then(|h| Host::new(h).ok())
    }

    /// Sweep period for the in-memory node
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    /// How long relocations are remembered
    pub fn relocation_ttl(&self) -> chrono::Duration {
        let secs = self.relocation_ttl_secs.min(MAX_RELOCATION_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    /// Validate node configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.host()?;
        if self.purge_interval_secs == 0 {
            return Err(ValidationError::InvalidPurgeInterval);
        }
        if self.relocation_ttl_secs > MAX_RELOCATION_TTL_SECS {
            return Err(ValidationError::InvalidRelocationTtl);
        }
        Ok(())
    }
}

fn default_purge_interval() -> u64 {
    60
}

fn default_relocation_ttl() -> u64 {
    DEFAULT_RELOCATION_TTL_SECS.unsigned_abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, parent: Option<&str>) -> NodeConfig {
        NodeConfig {
            host: host.to_string(),
            parent_host: parent.map(str::to_string),
            purge_interval_secs: default_purge_interval(),
            relocation_ttl_secs: default_relocation_ttl(),
        }
    }

    #[test]
    fn test_host_is_required() {
        assert_eq!(
            config("  ", None).validate(),
            Err(ValidationError::MissingRequired("NODE__HOST"))
        );
        assert!(config("http://a.local", None).validate().is_ok());
    }

    #[test]
    fn test_blank_parent_is_ignored() {
        assert!(config("a", Some("")).parent_host().is_none());
        assert_eq!(
            config("a", Some("http://p.local")).parent_host().unwrap(),
            "http://p.local"
        );
    }

    #[test]
    fn test_purge_interval_must_be_positive() {
        let mut node = config("http://a.local", None);
        assert_eq!(node.purge_interval(), Duration::from_secs(60));
        assert_eq!(node.relocation_ttl(), chrono::Duration::minutes(10));

        node.purge_interval_secs = 0;
        assert_eq!(node.validate(), Err(ValidationError::InvalidPurgeInterval));
    }

    #[test]
    fn test_relocation_ttl_is_bounded() {
        let mut node = config("http://a.local", None);
        node.relocation_ttl_secs = MAX_RELOCATION_TTL_SECS + 1;

        assert_eq!(node.validate(), Err(ValidationError::InvalidRelocationTtl));
        assert_eq!(node.relocation_ttl(), chrono::Duration::weeks(1));

        node.relocation_ttl_secs = 0;
        assert!(node.validate().is_ok());
    }
}
