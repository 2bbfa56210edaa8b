//! Session-affinity request admission.
//!
//! Wraps an axum handler so that every request is routed to the node that
//! owns its session before the handler runs:
//!
//! - `carrier` - where the session token travels on requests and responses
//! - `options` - the per-server decision policies (`HandlerOptions`)
//! - `service` - the orchestrator that picks one of the four outcomes
//! - `responses` - default redirect and error responses
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::http::admission::{create_handler, HandlerOptions};
//!
//! let node: Arc<dyn SessionNode> = Arc::new(InMemoryNode::new(host));
//! let app = Router::new().route(
//!     "/work",
//!     post(create_handler(node, HandlerOptions::default(), work)),
//! );
//! ```

mod carrier;
mod error;
mod handler;
mod options;
mod responses;
mod service;

pub use carrier::{
    read_token_from_header, write_token_to_header, RequestHead, DEFAULT_TOKEN_HEADER_NAME,
};
pub use error::{AdmissionError, HandlerError};
pub use handler::SessionHandler;
pub use options::{
    AcquireSessionOptionsFn, CreateSessionOptionsFn, ErrorResponseFn, HandlerOptions,
    HandlerOptionsBuilder, ReadTokenFn, RedirectNewRequestFn, RedirectResponseFn,
    RedirectTargetFn, WriteTokenFn,
};
pub use responses::{
    internal_error_response, malformed_token_response, plain_text_error, redirect_response,
};
pub use service::{create_handler, AdmissionService, Outcome, RedirectReason};
