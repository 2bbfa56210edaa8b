//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (host and session identifiers, errors)
//! - `session` - Session locations, tokens and their wire codec

pub mod foundation;
pub mod session;
