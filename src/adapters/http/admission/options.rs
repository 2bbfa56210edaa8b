//! Decision configuration for request admission.
//!
//! `HandlerOptions` is a record of independent policies. Each one has a
//! default, and overriding one through the builder leaves the others alone.
//! Build it once per server and share it; it is never mutated afterwards.
//!
//! | Policy | Default |
//! |---|---|
//! | read token | `X-Ermes-Token` request header |
//! | write token | `X-Ermes-Token` response header |
//! | create session options | `CreateSessionOptions::default()` |
//! | acquire session options | `AcquireSessionOptions::default()` |
//! | redirect new request | never |
//! | redirect target | host of the local node's parent |
//! | redirect response | `302 Found` to the host |
//! | malformed token response | `400` with the error text |
//! | internal error response | `500` with the error text |
//!
//! # Example
//!
//! ```ignore
//! let options = HandlerOptions::builder()
//!     .token_header_name("X-Session")
//!     .redirect_new_requests(true)
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use axum::response::Response;
use futures::future::{BoxFuture, FutureExt};

use super::carrier::{
    read_token_from_header, write_token_to_header, RequestHead, DEFAULT_TOKEN_HEADER_NAME,
};
use super::error::AdmissionError;
use super::responses::{internal_error_response, malformed_token_response, redirect_response};
use crate::domain::session::{AcquireSessionOptions, CreateSessionOptions};
use crate::ports::{NodeError, SessionNode};

pub type ReadTokenFn = Arc<dyn Fn(&RequestHead) -> Vec<u8> + Send + Sync>;
pub type WriteTokenFn = Arc<dyn Fn(&mut Response, &[u8]) + Send + Sync>;
pub type CreateSessionOptionsFn = Arc<dyn Fn(&RequestHead) -> CreateSessionOptions + Send + Sync>;
pub type AcquireSessionOptionsFn =
    Arc<dyn Fn(&RequestHead) -> AcquireSessionOptions + Send + Sync>;
pub type RedirectNewRequestFn = Arc<dyn Fn(&RequestHead, &dyn SessionNode) -> bool + Send + Sync>;
pub type RedirectTargetFn = Arc<
    dyn Fn(&RequestHead, Arc<dyn SessionNode>) -> BoxFuture<'static, Result<String, NodeError>>
        + Send
        + Sync,
>;
pub type RedirectResponseFn = Arc<dyn Fn(&RequestHead, &str) -> Response + Send + Sync>;
pub type ErrorResponseFn = Arc<dyn Fn(&AdmissionError) -> Response + Send + Sync>;

/// Policies consulted while admitting a request.
#[derive(Clone)]
pub struct HandlerOptions {
    pub(crate) read_token: ReadTokenFn,
    pub(crate) write_token: WriteTokenFn,
    pub(crate) create_session_options: CreateSessionOptionsFn,
    pub(crate) acquire_session_options: AcquireSessionOptionsFn,
    pub(crate) redirect_new_request: RedirectNewRequestFn,
    pub(crate) redirect_target: RedirectTargetFn,
    pub(crate) redirect_response: RedirectResponseFn,
    pub(crate) malformed_token_response: ErrorResponseFn,
    pub(crate) internal_error_response: ErrorResponseFn,
}

impl HandlerOptions {
    /// Starts a builder seeded with the defaults.
    pub fn builder() -> HandlerOptionsBuilder {
        HandlerOptionsBuilder::new()
    }
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            read_token: header_reader(DEFAULT_TOKEN_HEADER_NAME),
            write_token: header_writer(DEFAULT_TOKEN_HEADER_NAME),
            create_session_options: Arc::new(|_: &RequestHead| CreateSessionOptions::default()),
            acquire_session_options: Arc::new(|_: &RequestHead| AcquireSessionOptions::default()),
            redirect_new_request: Arc::new(|_: &RequestHead, _: &dyn SessionNode| false),
            redirect_target: Arc::new(|_: &RequestHead, node: Arc<dyn SessionNode>| {
                async move {
                    let parent = node.get_parent_node_of(node.host()).await?;
                    Ok::<_, NodeError>(parent.host.to_string())
                }
                .boxed()
            }),
            redirect_response: Arc::new(redirect_response),
            malformed_token_response: Arc::new(malformed_token_response),
            internal_error_response: Arc::new(internal_error_response),
        }
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions").finish_non_exhaustive()
    }
}

fn header_reader(header_name: &str) -> ReadTokenFn {
    let header_name = header_name.to_string();
    Arc::new(move |head: &RequestHead| read_token_from_header(head, &header_name))
}

fn header_writer(header_name: &str) -> WriteTokenFn {
    let header_name = header_name.to_string();
    Arc::new(move |response: &mut Response, bytes: &[u8]| {
        write_token_to_header(response, bytes, &header_name)
    })
}

/// Builder for [`HandlerOptions`].
#[derive(Debug, Clone, Default)]
pub struct HandlerOptionsBuilder {
    options: HandlerOptions,
}

impl HandlerOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the token from, and writes it to, the given header.
    pub fn token_header_name(mut self, header_name: impl AsRef<str>) -> Self {
        self.options.read_token = header_reader(header_name.as_ref());
        self.options.write_token = header_writer(header_name.as_ref());
        self
    }

    pub fn read_token_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead) -> Vec<u8> + Send + Sync + 'static,
    {
        self.options.read_token = Arc::new(f);
        self
    }

    pub fn write_token_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Response, &[u8]) + Send + Sync + 'static,
    {
        self.options.write_token = Arc::new(f);
        self
    }

    pub fn create_session_options_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead) -> CreateSessionOptions + Send + Sync + 'static,
    {
        self.options.create_session_options = Arc::new(f);
        self
    }

    /// Uses the same create options for every request.
    pub fn create_session_options(self, options: CreateSessionOptions) -> Self {
        self.create_session_options_with(move |_| options.clone())
    }

    pub fn acquire_session_options_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead) -> AcquireSessionOptions + Send + Sync + 'static,
    {
        self.options.acquire_session_options = Arc::new(f);
        self
    }

    /// Uses the same acquire options for every request.
    pub fn acquire_session_options(self, options: AcquireSessionOptions) -> Self {
        self.acquire_session_options_with(move |_| options)
    }

    pub fn redirect_new_request_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead, &dyn SessionNode) -> bool + Send + Sync + 'static,
    {
        self.options.redirect_new_request = Arc::new(f);
        self
    }

    /// Redirects every token-less request (or none).
    pub fn redirect_new_requests(self, redirect: bool) -> Self {
        self.redirect_new_request_with(move |_, _| redirect)
    }

    pub fn redirect_target_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead, Arc<dyn SessionNode>) -> BoxFuture<'static, Result<String, NodeError>>
            + Send
            + Sync
            + 'static,
    {
        self.options.redirect_target = Arc::new(f);
        self
    }

    pub fn redirect_response_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestHead, &str) -> Response + Send + Sync + 'static,
    {
        self.options.redirect_response = Arc::new(f);
        self
    }

    pub fn malformed_token_response_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&AdmissionError) -> Response + Send + Sync + 'static,
    {
        self.options.malformed_token_response = Arc::new(f);
        self
    }

    pub fn internal_error_response_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&AdmissionError) -> Response + Send + Sync + 'static,
    {
        self.options.internal_error_response = Arc::new(f);
        self
    }

    pub fn build(self) -> HandlerOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    use crate::domain::foundation::Host;
    use crate::domain::session::{CreateAndAcquireSessionOptions, SessionLocation, SessionToken};
    use crate::ports::{NodeInfo, ResumeTask, SessionTask};

    struct TopologyOnlyNode {
        host: Host,
        parent: Option<Host>,
    }

    #[async_trait]
    impl SessionNode for TopologyOnlyNode {
        fn host(&self) -> &Host {
            &self.host
        }

        async fn create_and_acquire_session(
            &self,
            _options: CreateAndAcquireSessionOptions,
            _task: SessionTask,
        ) -> Result<(), NodeError> {
            Err(NodeError::Unavailable("not a session store".to_string()))
        }

        async fn acquire_session(
            &self,
            _token: &SessionToken,
            _options: AcquireSessionOptions,
            _task: ResumeTask,
        ) -> Result<Option<SessionLocation>, NodeError> {
            Err(NodeError::Unavailable("not a session store".to_string()))
        }

        async fn get_parent_node_of(&self, host: &Host) -> Result<NodeInfo, NodeError> {
            self.parent
                .clone()
                .map(NodeInfo::new)
                .ok_or_else(|| NodeError::NoParent(host.to_string()))
        }
    }

    fn node(parent: Option<&str>) -> Arc<dyn SessionNode> {
        Arc::new(TopologyOnlyNode {
            host: Host::new("edge-a").unwrap(),
            parent: parent.map(|p| Host::new(p).unwrap()),
        })
    }

    fn head_with_token(header: &str, value: &str) -> RequestHead {
        RequestHead::of(
            &Request::builder()
                .uri("/")
                .header(header, value)
                .body(Body::empty())
                .unwrap(),
        )
    }

    #[test]
    fn defaults_read_the_ermes_header() {
        let options = HandlerOptions::default();
        let head = head_with_token("X-Ermes-Token", "abc");
        assert_eq!((options.read_token)(&head), b"abc".to_vec());
    }

    #[test]
    fn defaults_do_not_redirect_new_requests() {
        let options = HandlerOptions::default();
        let head = head_with_token("X-Other", "1");
        assert!(!(options.redirect_new_request)(&head, node(None).as_ref()));
    }

    #[tokio::test]
    async fn default_redirect_target_is_parent_host() {
        let options = HandlerOptions::default();
        let head = head_with_token("X-Other", "1");
        let target = (options.redirect_target)(&head, node(Some("region-eu"))).await;
        assert_eq!(target.unwrap(), "region-eu");
    }

    #[tokio::test]
    async fn default_redirect_target_fails_without_parent() {
        let options = HandlerOptions::default();
        let head = head_with_token("X-Other", "1");
        let target = (options.redirect_target)(&head, node(None)).await;
        assert_eq!(target.unwrap_err(), NodeError::NoParent("edge-a".to_string()));
    }

    #[test]
    fn token_header_name_rebinds_read_and_write() {
        let options = HandlerOptions::builder().token_header_name("X-Session").build();

        let head = head_with_token("X-Session", "xyz");
        assert_eq!((options.read_token)(&head), b"xyz".to_vec());

        let mut response = Response::new(Body::empty());
        (options.write_token)(&mut response, b"xyz");
        assert_eq!(response.headers().get("X-Session").unwrap(), "xyz");
        assert!(response.headers().get(DEFAULT_TOKEN_HEADER_NAME).is_none());
    }

    #[test]
    fn overriding_one_policy_keeps_the_others() {
        let options = HandlerOptions::builder()
            .redirect_new_requests(true)
            .build();

        let head = head_with_token("X-Ermes-Token", "abc");
        assert!((options.redirect_new_request)(&head, node(None).as_ref()));
        assert_eq!((options.read_token)(&head), b"abc".to_vec());

        let response = (options.redirect_response)(&head, "edge-b");
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[test]
    fn constant_acquire_options_apply_to_every_request() {
        let options = HandlerOptions::builder()
            .acquire_session_options(AcquireSessionOptions {
                allow_offloading: false,
                allow_while_offloading: false,
            })
            .build();

        let head = head_with_token("X-Other", "1");
        assert!(!(options.acquire_session_options)(&head).allow_offloading);
    }
}
