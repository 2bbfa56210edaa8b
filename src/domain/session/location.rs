//! Session location value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Host, SessionId, ValidationError};

/// Where a session lives: the owning node and the session's identifier.
///
/// Immutable. A relocation produces a new `SessionLocation`, it never edits
/// one field of an existing value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionLocation {
    #[serde(rename = "Host")]
    host: Host,
    #[serde(rename = "SessionId")]
    session_id: SessionId,
}

impl SessionLocation {
    pub fn new(host: Host, session_id: SessionId) -> Self {
        Self { host, session_id }
    }

    /// Builds a location from raw strings, validating both parts.
    pub fn parse(
        host: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            host: Host::new(host)?,
            session_id: SessionId::new(session_id)?,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl fmt::Display for SessionLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.session_id, self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_validates_both_fields() {
        assert!(SessionLocation::parse("a", "s1").is_ok());
        assert!(SessionLocation::parse("", "s1").is_err());
        assert!(SessionLocation::parse("a", "").is_err());
    }

    #[test]
    fn display_shows_session_and_host() {
        let location = SessionLocation::parse("node-a", "s1").unwrap();
        assert_eq!(location.to_string(), "s1@node-a");
    }
}
