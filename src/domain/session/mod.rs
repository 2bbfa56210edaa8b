//! Session domain module.
//!
//! Describes where a session lives and the token a client carries between
//! requests so that every request can be routed back to the owning node.
//!
//! # Types
//!
//! - `SessionLocation` - owning node host plus session identifier
//! - `SessionToken` - the client-held token wrapping a location
//! - `CreateSessionOptions` / `AcquireSessionOptions` - values handed through
//!   to the node that stores sessions

mod errors;
mod location;
mod options;
mod token;

pub use errors::TokenError;
pub use location::SessionLocation;
pub use options::{
    AcquireSessionOptions, CreateAndAcquireSessionOptions, CreateSessionOptions, GeoCoordinates,
};
pub use token::SessionToken;
