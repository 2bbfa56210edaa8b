//! Contract for the caller's session handler.

use std::future::Future;

use axum::{extract::Request, response::Response};
use futures::future::{BoxFuture, FutureExt};

use super::error::HandlerError;
use crate::domain::session::SessionToken;

/// Business logic run while a session is held.
///
/// A handler reports failure by returning `Err` instead of a response, so
/// nothing reaches the client before admission has picked the error path.
///
/// Any `Fn(Request, SessionToken) -> impl Future<Output = Result<Response,
/// HandlerError>>` closure is a handler.
pub trait SessionHandler: Send + Sync + 'static {
    fn call(
        &self,
        request: Request,
        token: SessionToken,
    ) -> BoxFuture<'static, Result<Response, HandlerError>>;
}

impl<F, Fut> SessionHandler for F
where
    F: Fn(Request, SessionToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn call(
        &self,
        request: Request,
        token: SessionToken,
    ) -> BoxFuture<'static, Result<Response, HandlerError>> {
        self(request, token).boxed()
    }
}
