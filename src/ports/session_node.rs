//! Session node port - the session store that admission sequences calls into.
//!
//! A node owns sessions: it creates them, grants exclusive access to them
//! while a request runs, and relocates them to other nodes. The admission
//! layer never touches session state itself; it only decides which of the
//! calls below to make for a request.
//!
//! # Exclusivity precondition
//!
//! Implementations MUST guarantee that at most one acquisition of a given
//! session identifier is in progress at any time, across
//! `create_and_acquire_session` and `acquire_session`. Concurrent callers
//! wait; they are neither rejected nor run in parallel. The admission layer
//! holds no locks of its own and relies on this guarantee entirely.
//!
//! # Cancellation
//!
//! Every call may suspend (for example while waiting for a busy session).
//! Dropping the returned future cancels the call; implementations must
//! release anything they acquired when that happens. Nothing here retries.

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::foundation::Host;
use crate::domain::session::{
    AcquireSessionOptions, CreateAndAcquireSessionOptions, SessionLocation, SessionToken,
};

/// Continuation run while a freshly created session is held.
pub type SessionTask =
    Box<dyn FnOnce(SessionToken) -> BoxFuture<'static, Result<(), TaskError>> + Send>;

/// Continuation run while an existing session is held.
pub type ResumeTask = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), TaskError>> + Send>;

/// Failure reported by a continuation.
///
/// The node must surface it unchanged as `NodeError::TaskFailed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("session task failed: {0}")]
pub struct TaskError(pub String);

impl TaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors returned by a session node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("no parent node known for {0}")]
    NoParent(String),

    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    TaskFailed(#[from] TaskError),

    /// The node answered in a way its contract rules out, e.g. reporting
    /// success without running the task. Raised by callers, not by nodes.
    #[error("session node broke its contract: {0}")]
    Protocol(String),
}

/// Description of another node in the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub host: Host,
}

impl NodeInfo {
    pub fn new(host: Host) -> Self {
        Self { host }
    }
}

/// The session-storing node this process runs as.
#[async_trait]
pub trait SessionNode: Send + Sync {
    /// Identity of this node, compared against token hosts.
    fn host(&self) -> &Host;

    /// Creates a session on this node, acquires it, and runs `task` with
    /// the token of the new session while it is held.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - the session was created and `task` completed successfully
    /// * `Err(NodeError::TaskFailed)` - `task` ran and reported failure
    /// * `Err(_)` - the session could not be created or acquired
    async fn create_and_acquire_session(
        &self,
        options: CreateAndAcquireSessionOptions,
        task: SessionTask,
    ) -> Result<(), NodeError>;

    /// Acquires the session named by `token` and runs `task` while it is held.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - the session stays on this node
    /// * `Ok(Some(location))` - the session has been relocated to `location`;
    ///   `task` may or may not have run before the relocation
    /// * `Err(NodeError::TaskFailed)` - `task` ran and reported failure
    /// * `Err(_)` - the session could not be acquired
    async fn acquire_session(
        &self,
        token: &SessionToken,
        options: AcquireSessionOptions,
        task: ResumeTask,
    ) -> Result<Option<SessionLocation>, NodeError>;

    /// Returns the parent of `host` in the mesh topology.
    async fn get_parent_node_of(&self, host: &Host) -> Result<NodeInfo, NodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::FutureExt;

    #[test]
    fn session_node_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionNode>();
    }

    #[test]
    fn task_error_is_transparent_inside_node_error() {
        let err: NodeError = TaskError::new("handler exploded").into();
        assert_eq!(err.to_string(), "session task failed: handler exploded");
    }

    #[tokio::test]
    async fn session_task_can_be_boxed_from_async_closure() {
        let task: SessionTask = Box::new(|token: SessionToken| {
            async move {
                if token.host() == "A" {
                    Ok(())
                } else {
                    Err(TaskError::new("wrong host"))
                }
            }
            .boxed()
        });

        let token = SessionToken::new(SessionLocation::parse("A", "s1").unwrap());
        assert!(task(token).await.is_ok());
    }
}
