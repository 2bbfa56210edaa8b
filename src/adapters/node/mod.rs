//! Session node adapters.
//!
//! Implementations of the `SessionNode` port.
//!
//! ## Available Adapters
//!
//! - **InMemoryNode** - Keeps sessions in process memory (single node, development and tests)

mod in_memory;

pub use in_memory::{InMemoryNode, PurgeReport, DEFAULT_RELOCATION_TTL_SECS};
