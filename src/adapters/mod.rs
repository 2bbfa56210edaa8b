//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Request admission in front of axum handlers
//! - `node` - Session node implementations (in-memory)

pub mod http;
pub mod node;

pub use node::InMemoryNode;
