//! Session token error types.

use thiserror::Error;

/// Errors raised by the session token codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The client sent bytes that do not decode into a token.
    #[error("malformed session token: {0}")]
    Malformed(String),

    /// A token built by this process could not be encoded.
    ///
    /// Tokens are well-formed by construction, so this is a defect in the
    /// code, never bad input.
    #[error("session token encoding failed: {0}")]
    Encoding(String),
}

impl TokenError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        TokenError::Malformed(reason.into())
    }

    pub fn encoding(reason: impl Into<String>) -> Self {
        TokenError::Encoding(reason.into())
    }

    /// Whether the error came from client input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, TokenError::Malformed(_))
    }
}
