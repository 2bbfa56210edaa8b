//! Request orchestrator.
//!
//! Decides, for every request, whether to redirect it, create a session and
//! run the handler, resume a session and run the handler, or redirect
//! because the session moved while it was held.
//!
//! ```text
//! read carrier → decode ──malformed──────────────────────────→ 400
//!                  │
//!                  ├─ token, foreign host ───────────────────→ 302 to token host (+ token)
//!                  ├─ token, local host ─→ acquire ─┬─ stays ─→ handler response
//!                  │                                ├─ moved ─→ 302 to token host (+ token)
//!                  │                                └─ error ─→ 500
//!                  └─ no token ─┬─ redirect policy ──────────→ 302 to target
//!                               └─ create+acquire ─┬─ ok ────→ handler response (+ new token)
//!                                                  └─ error ─→ 500
//! ```
//!
//! Exactly one terminal action happens per request, the carrier is written
//! at most once, and the handler runs at most once.

use std::sync::Arc;

use axum::{extract::Request, http::HeaderValue, response::Response};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::oneshot;

use super::carrier::RequestHead;
use super::error::AdmissionError;
use super::handler::SessionHandler;
use super::options::HandlerOptions;
use crate::domain::session::{
    CreateAndAcquireSessionOptions, SessionLocation, SessionToken, TokenError,
};
use crate::ports::{NodeError, ResumeTask, SessionNode, SessionTask, TaskError};

// ════════════════════════════════════════════════════════════════════════════
// Outcome
// ════════════════════════════════════════════════════════════════════════════

/// Why a request was redirected without running the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The token names a session owned by another node.
    ForeignSession,
    /// The redirect-new-request policy sent a token-less request elsewhere.
    NewRequest,
}

/// The decision taken for a request.
///
/// Attached to every response produced by [`AdmissionService::handle`] as a
/// response extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Redirected {
        target: String,
        reason: RedirectReason,
    },
    Created {
        location: SessionLocation,
    },
    Resumed {
        location: SessionLocation,
    },
    /// The session was relocated while held. `target` is the host the client
    /// was redirected to, `new_location` is where the node says it went.
    Offloaded {
        target: String,
        new_location: SessionLocation,
    },
    MalformedToken,
    Failed {
        kind: &'static str,
    },
}

impl Outcome {
    /// Reads the outcome recorded on a response.
    pub fn of(response: &Response) -> Option<&Outcome> {
        response.extensions().get::<Outcome>()
    }
}

fn with_outcome(mut response: Response, outcome: Outcome) -> Response {
    response.extensions_mut().insert(outcome);
    response
}

// ════════════════════════════════════════════════════════════════════════════
// Service
// ════════════════════════════════════════════════════════════════════════════

/// What the create continuation hands back to the orchestrator.
struct CreatedSession {
    location: SessionLocation,
    token_bytes: Option<Vec<u8>>,
    result: Result<Response, AdmissionError>,
}

/// Admits requests against a session node.
///
/// Holds no mutable state; clone it freely or share it behind an `Arc`.
#[derive(Clone)]
pub struct AdmissionService {
    node: Arc<dyn SessionNode>,
    options: HandlerOptions,
    handler: Arc<dyn SessionHandler>,
}

impl AdmissionService {
    pub fn new(
        node: Arc<dyn SessionNode>,
        options: HandlerOptions,
        handler: impl SessionHandler,
    ) -> Self {
        Self {
            node,
            options,
            handler: Arc::new(handler),
        }
    }

    pub fn node(&self) -> &Arc<dyn SessionNode> {
        &self.node
    }

    /// Runs the full admission sequence for one request.
    pub async fn handle(&self, request: Request) -> Response {
        let head = RequestHead::of(&request);
        let token_bytes = (self.options.read_token)(&head);

        let token = match SessionToken::decode(&token_bytes) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(error = %e, "Rejecting malformed session token");
                let err = AdmissionError::from(e);
                let response = (self.options.malformed_token_response)(&err);
                return with_outcome(response, Outcome::MalformedToken);
            }
        };

        match token {
            Some(token) if token.host() != self.node.host() => {
                self.redirect_foreign(&head, &token, &token_bytes)
            }
            Some(token) => self.resume(request, &head, token, token_bytes).await,
            None => self.admit_new(request, &head).await,
        }
    }

    /// The client reached the wrong node: send it to the owner, token intact.
    fn redirect_foreign(
        &self,
        head: &RequestHead,
        token: &SessionToken,
        token_bytes: &[u8],
    ) -> Response {
        let target = token.host().to_string();
        if !is_valid_location(&target) {
            // The host came from the client, so the token is what is wrong.
            let err = AdmissionError::from(TokenError::malformed(format!(
                "Host {:?} cannot be used as a redirect target",
                target
            )));
            tracing::debug!(error = %err, "Rejecting session token with unusable host");
            let response = (self.options.malformed_token_response)(&err);
            return with_outcome(response, Outcome::MalformedToken);
        }
        tracing::info!(
            token_host = %target,
            local_host = %self.node.host(),
            session_id = %token.session_id(),
            "Session owned by another node, redirecting"
        );

        let mut response = (self.options.redirect_response)(head, &target);
        (self.options.write_token)(&mut response, token_bytes);
        with_outcome(
            response,
            Outcome::Redirected {
                target,
                reason: RedirectReason::ForeignSession,
            },
        )
    }

    async fn admit_new(&self, request: Request, head: &RequestHead) -> Response {
        if (self.options.redirect_new_request)(head, self.node.as_ref()) {
            return match (self.options.redirect_target)(head, Arc::clone(&self.node)).await {
                Ok(target) if !is_valid_location(&target) => {
                    self.fail(AdmissionError::InvalidRedirectTarget(target), None)
                }
                Ok(target) => {
                    tracing::info!(redirect_to = %target, "Redirecting new request");
                    let response = (self.options.redirect_response)(head, &target);
                    with_outcome(
                        response,
                        Outcome::Redirected {
                            target,
                            reason: RedirectReason::NewRequest,
                        },
                    )
                }
                Err(e) => self.fail(e.into(), None),
            };
        }

        self.create(request, head).await
    }

    async fn create(&self, request: Request, head: &RequestHead) -> Response {
        let options = CreateAndAcquireSessionOptions {
            create: (self.options.create_session_options)(head),
            acquire: (self.options.acquire_session_options)(head),
        };

        let (tx, mut rx) = oneshot::channel::<CreatedSession>();
        let handler = Arc::clone(&self.handler);
        let task: SessionTask = Box::new(move |token: SessionToken| {
            async move {
                let location = token.location().clone();
                // Encode before running the handler: a token we cannot write
                // must not leave a handler side effect behind.
                let created = match token.encode() {
                    Ok(bytes) => CreatedSession {
                        location,
                        token_bytes: Some(bytes),
                        result: handler
                            .call(request, token)
                            .await
                            .map_err(AdmissionError::from),
                    },
                    Err(e) => CreatedSession {
                        location,
                        token_bytes: None,
                        result: Err(AdmissionError::from(e)),
                    },
                };
                let task_result = task_result(&created.result);
                let _ = tx.send(created);
                task_result
            }
            .boxed()
        });

        let stored = self.node.create_and_acquire_session(options, task).await;

        match (stored, rx.try_recv().ok()) {
            (
                Ok(()),
                Some(CreatedSession {
                    location,
                    token_bytes: Some(bytes),
                    result: Ok(mut response),
                }),
            ) => {
                tracing::debug!(
                    host = %location.host(),
                    session_id = %location.session_id(),
                    "Created session"
                );
                (self.options.write_token)(&mut response, &bytes);
                with_outcome(response, Outcome::Created { location })
            }
            (
                _,
                Some(CreatedSession {
                    token_bytes,
                    result: Err(err),
                    ..
                }),
            ) => self.fail(err, token_bytes),
            (Err(err), created) => self.fail(err.into(), created.and_then(|c| c.token_bytes)),
            (Ok(()), _) => self.fail(
                NodeError::Protocol("session created without running the handler".to_string())
                    .into(),
                None,
            ),
        }
    }

    async fn resume(
        &self,
        request: Request,
        head: &RequestHead,
        token: SessionToken,
        token_bytes: Vec<u8>,
    ) -> Response {
        let options = (self.options.acquire_session_options)(head);

        let (tx, mut rx) = oneshot::channel::<Result<Response, AdmissionError>>();
        let handler = Arc::clone(&self.handler);
        let task_token = token.clone();
        let task: ResumeTask = Box::new(move || {
            async move {
                let result = handler
                    .call(request, task_token)
                    .await
                    .map_err(AdmissionError::from);
                let task_result = task_result(&result);
                let _ = tx.send(result);
                task_result
            }
            .boxed()
        });

        let acquired = self.node.acquire_session(&token, options, task).await;

        match (acquired, rx.try_recv().ok()) {
            (Ok(Some(new_location)), _) => {
                // The client is sent back to the host it already knows, with
                // the token it already holds; the new location only decides
                // that a redirect is needed.
                let target = token.host().to_string();
                if !is_valid_location(&target) {
                    return self.fail(AdmissionError::InvalidRedirectTarget(target), None);
                }
                tracing::info!(
                    session_id = %token.session_id(),
                    redirect_to = %target,
                    new_location = %new_location,
                    "Session offloaded while held, redirecting"
                );

                let mut response = (self.options.redirect_response)(head, &target);
                (self.options.write_token)(&mut response, &token_bytes);
                with_outcome(
                    response,
                    Outcome::Offloaded {
                        target,
                        new_location,
                    },
                )
            }
            (Ok(None), Some(Ok(response))) => {
                tracing::debug!(session_id = %token.session_id(), "Resumed session");
                with_outcome(
                    response,
                    Outcome::Resumed {
                        location: token.location().clone(),
                    },
                )
            }
            (_, Some(Err(err))) => self.fail(err, None),
            (Err(err), _) => self.fail(err.into(), None),
            (Ok(None), None) => self.fail(
                NodeError::Protocol("session acquired without running the handler".to_string())
                    .into(),
                None,
            ),
        }
    }

    /// Builds the 500 response. `token_bytes` is set when a session already
    /// exists for the client and its token must still reach it.
    fn fail(&self, err: AdmissionError, token_bytes: Option<Vec<u8>>) -> Response {
        if err.is_defect() {
            tracing::error!(kind = err.kind(), error = %err, "Admission defect, aborting request");
        } else {
            tracing::warn!(kind = err.kind(), error = %err, "Admission failed");
        }

        let mut response = (self.options.internal_error_response)(&err);
        if let Some(bytes) = token_bytes {
            (self.options.write_token)(&mut response, &bytes);
        }
        with_outcome(response, Outcome::Failed { kind: err.kind() })
    }
}

/// Whether `target` can be sent as a `Location` header.
fn is_valid_location(target: &str) -> bool {
    HeaderValue::from_str(target).is_ok()
}

fn task_result<T>(result: &Result<T, AdmissionError>) -> Result<(), TaskError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(TaskError::new(e.to_string())),
    }
}

/// Wraps a handler into an axum handler that admits every request first.
///
/// # Example
///
/// ```ignore
/// let app = Router::new().route(
///     "/work",
///     post(create_handler(node, HandlerOptions::default(), work)),
/// );
/// ```
pub fn create_handler(
    node: Arc<dyn SessionNode>,
    options: HandlerOptions,
    handler: impl SessionHandler,
) -> impl Fn(Request) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    let service = Arc::new(AdmissionService::new(node, options, handler));
    move |request: Request| {
        let service = Arc::clone(&service);
        async move { service.handle(request).await }.boxed()
    }
}
