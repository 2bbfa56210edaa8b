//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers and error types that form the vocabulary of
//! session admission.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::{Host, SessionId};
