//! Strongly-typed identifier value objects.
//!
//! Both identifiers travel inside the session token as plain strings, so
//! they are string newtypes rather than UUIDs: a node may mint session ids
//! in whatever shape it likes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Address or identifier of a node in the mesh.
///
/// Compared verbatim: two hosts are the same node only if their strings match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Host(String);

impl Host {
    /// Creates a new Host, returning error if empty.
    pub fn new(host: impl Into<String>) -> Result<Self, ValidationError> {
        let host = host.into();
        if host.is_empty() {
            return Err(ValidationError::empty_field("Host"));
        }
        Ok(Self(host))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Host {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Host {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Host> for String {
    fn from(host: Host) -> Self {
        host.0
    }
}

impl PartialEq<str> for Host {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Host {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque identifier of a session, unique within the mesh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new SessionId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::empty_field("SessionId"));
        }
        Ok(Self(id))
    }

    /// Creates a new random SessionId backed by a v4 UUID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_accepts_non_empty_string() {
        let host = Host::new("http://a.local").unwrap();
        assert_eq!(host.as_str(), "http://a.local");
        assert_eq!(host, "http://a.local");
    }

    #[test]
    fn host_rejects_empty_string() {
        match Host::new("") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "Host"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn host_parses_from_str() {
        let host: Host = "b".parse().unwrap();
        assert_eq!(host.to_string(), "b");
        assert!("".parse::<Host>().is_err());
    }

    #[test]
    fn session_id_rejects_empty_string() {
        match SessionId::new("") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "SessionId"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn session_id_generates_unique_values() {
        let id1 = SessionId::generate();
        let id2 = SessionId::generate();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn session_id_serializes_as_plain_string() {
        let id = SessionId::new("s1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"s1\"");
    }

    #[test]
    fn session_id_deserialization_rejects_empty_string() {
        let result: Result<SessionId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
