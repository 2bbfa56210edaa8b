//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Session Ports
//!
//! - `SessionNode` - The node that stores, locks, and relocates sessions

mod session_node;

pub use session_node::{NodeError, NodeInfo, ResumeTask, SessionNode, SessionTask, TaskError};
