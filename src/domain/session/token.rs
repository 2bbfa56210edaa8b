//! Session token and its wire codec.
//!
//! The token travels with every request as a flat JSON object:
//!
//! ```text
//! {"Host":"http://node-a.local","SessionId":"0b5e..."}
//! ```
//!
//! Empty bytes mean the client has no session yet. Unknown fields are
//! ignored on decode so that older nodes accept tokens minted by newer ones.

use serde::{Deserialize, Serialize};

use super::{SessionLocation, TokenError};
use crate::domain::foundation::{Host, SessionId};

/// Token a client presents to be routed to its session.
///
/// The host of the wrapped location is the node currently believed to own
/// the session, and it is the only field consulted to detect staleness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken {
    #[serde(flatten)]
    location: SessionLocation,
}

impl SessionToken {
    /// Creates a fresh token for a newly created session.
    pub fn new(location: SessionLocation) -> Self {
        Self { location }
    }

    /// Creates the token that follows a relocation of the session.
    ///
    /// The location is replaced wholesale; every other field of `self`
    /// carries over.
    pub fn relocated(self, new_location: SessionLocation) -> Self {
        Self {
            location: new_location,
        }
    }

    pub fn location(&self) -> &SessionLocation {
        &self.location
    }

    pub fn host(&self) -> &Host {
        self.location.host()
    }

    pub fn session_id(&self) -> &SessionId {
        self.location.session_id()
    }

    /// Decodes a token from carrier bytes.
    ///
    /// Returns `Ok(None)` for empty input and `TokenError::Malformed` for
    /// anything that is not a well-formed token.
    pub fn decode(bytes: &[u8]) -> Result<Option<Self>, TokenError> {
        if bytes.is_empty() {
            return Ok(None);
        }

        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| TokenError::malformed(e.to_string()))
    }

    /// Encodes the token into carrier bytes.
    ///
    /// A failure here means a token was built that cannot be represented,
    /// and is reported as `TokenError::Encoding`.
    pub fn encode(&self) -> Result<Vec<u8>, TokenError> {
        serde_json::to_vec(self).map_err(|e| TokenError::encoding(e.to_string()))
    }
}

impl From<SessionLocation> for SessionToken {
    fn from(location: SessionLocation) -> Self {
        Self::new(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token(host: &str, session_id: &str) -> SessionToken {
        SessionToken::new(SessionLocation::parse(host, session_id).unwrap())
    }

    #[test]
    fn encode_produces_flat_object() {
        let bytes = token("A", "s1").encode().unwrap();
        assert_eq!(bytes, br#"{"Host":"A","SessionId":"s1"}"#.to_vec());
    }

    #[test]
    fn decode_empty_bytes_is_absent() {
        assert_eq!(SessionToken::decode(b"").unwrap(), None);
    }

    #[test]
    fn decode_well_formed_token() {
        let decoded = SessionToken::decode(br#"{"Host":"B","SessionId":"s1"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(decoded, token("B", "s1"));
        assert_eq!(decoded.host(), "B");
        assert_eq!(decoded.session_id().as_str(), "s1");
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let decoded =
            SessionToken::decode(br#"{"Host":"B","SessionId":"s1","Region":"eu"}"#).unwrap();
        assert_eq!(decoded, Some(token("B", "s1")));
    }

    #[test]
    fn decode_truncated_input_is_malformed() {
        let err = SessionToken::decode(br#"{"Host":"B","Sess"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn decode_missing_field_is_malformed() {
        let err = SessionToken::decode(br#"{"Host":"B"}"#).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[test]
    fn decode_empty_host_is_malformed() {
        let err = SessionToken::decode(br#"{"Host":"","SessionId":"s1"}"#).unwrap_err();
        assert!(err.to_string().contains("Host"));
    }

    #[test]
    fn decode_wrong_shape_is_malformed() {
        for input in [&b"null"[..], b"[]", b"42", b"\"token\"", b" "] {
            assert!(
                SessionToken::decode(input).unwrap_err().is_malformed(),
                "input {:?} should be malformed",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn relocated_replaces_location_wholesale() {
        let original = token("A", "s1");
        let moved = original.relocated(SessionLocation::parse("B", "s9").unwrap());
        assert_eq!(moved.host(), "B");
        assert_eq!(moved.session_id().as_str(), "s9");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(host in "\\PC{1,40}", session_id in "\\PC{1,40}") {
            let original = token(&host, &session_id);
            let bytes = original.encode().unwrap();
            prop_assert_eq!(SessionToken::decode(&bytes).unwrap(), Some(original));
        }

        #[test]
        fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 1..64)) {
            match SessionToken::decode(&bytes) {
                Ok(Some(t)) => {
                    prop_assert!(!t.host().as_str().is_empty());
                    prop_assert!(!t.session_id().as_str().is_empty());
                }
                Ok(None) => prop_assert!(false, "non-empty input decoded as absent"),
                Err(e) => prop_assert!(e.is_malformed()),
            }
        }
    }
}
