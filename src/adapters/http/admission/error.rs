//! Admission error taxonomy.
//!
//! Every failure on the admission path ends up as one of these variants,
//! and every variant maps to exactly one of two HTTP classes: 400 for a
//! token the client can fix, 500 for everything else.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::session::TokenError;
use crate::ports::NodeError;

/// Failure reported by a caller's session handler.
///
/// The message is surfaced verbatim in the 500 response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Errors surfaced by request admission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The request carried a token that does not decode.
    #[error(transparent)]
    MalformedToken(TokenError),

    /// Creating, acquiring, or locating a session failed on the node.
    #[error(transparent)]
    SessionStoreFailure(NodeError),

    /// The caller's handler failed before committing a response.
    #[error(transparent)]
    HandlerFailure(HandlerError),

    /// A token this process built could not be encoded. Always a code defect.
    #[error(transparent)]
    EncodingDefect(TokenError),

    /// A redirect target chosen on the server side cannot be sent as a
    /// `Location` header.
    #[error("redirect target {0:?} is not a valid Location header value")]
    InvalidRedirectTarget(String),
}

impl AdmissionError {
    /// HTTP status class of the error response.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdmissionError::MalformedToken(_) => StatusCode::BAD_REQUEST,
            AdmissionError::SessionStoreFailure(_)
            | AdmissionError::HandlerFailure(_)
            | AdmissionError::EncodingDefect(_)
            | AdmissionError::InvalidRedirectTarget(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error indicates a bug in this crate rather than a
    /// runtime failure.
    pub fn is_defect(&self) -> bool {
        matches!(self, AdmissionError::EncodingDefect(_))
    }

    /// Short machine-readable kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AdmissionError::MalformedToken(_) => "malformed_token",
            AdmissionError::SessionStoreFailure(_) => "session_store_failure",
            AdmissionError::HandlerFailure(_) => "handler_failure",
            AdmissionError::EncodingDefect(_) => "encoding_defect",
            AdmissionError::InvalidRedirectTarget(_) => "invalid_redirect_target",
        }
    }
}

impl From<TokenError> for AdmissionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed(_) => AdmissionError::MalformedToken(err),
            TokenError::Encoding(_) => AdmissionError::EncodingDefect(err),
        }
    }
}

impl From<NodeError> for AdmissionError {
    fn from(err: NodeError) -> Self {
        AdmissionError::SessionStoreFailure(err)
    }
}

impl From<HandlerError> for AdmissionError {
    fn from(err: HandlerError) -> Self {
        AdmissionError::HandlerFailure(err)
    }
}
