//! Ermes Gateway - session-affine request admission
//!
//! Routes every request of an edge compute mesh to the node that owns its
//! session. A request either carries no token (a session is created here),
//! a token owned by this node (the session is resumed), or a token owned by
//! another node (the client is redirected there).

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
