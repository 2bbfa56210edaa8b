//! HTTP adapters.
//!
//! - `admission` - session-affinity admission in front of request handlers

pub mod admission;

pub use admission::{create_handler, AdmissionService, HandlerOptions, Outcome, SessionHandler};
