//! Token carrier: the request/response field that transports session tokens.
//!
//! By default the token rides in the `X-Ermes-Token` header. The bytes are
//! passed through untouched; decoding is the codec's job.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version},
    response::Response,
};

/// Default name of the header carrying the session token.
pub const DEFAULT_TOKEN_HEADER_NAME: &str = "X-Ermes-Token";

/// Snapshot of a request's head.
///
/// Decision policies see this instead of the request itself, because the
/// request (and its body) is handed to the caller's handler while the
/// orchestrator may still need to build a redirect or error response.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub fn of(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
        }
    }
}

/// Reads the token bytes from `header_name`, or empty bytes if absent.
pub fn read_token_from_header(head: &RequestHead, header_name: &str) -> Vec<u8> {
    head.headers
        .get(header_name)
        .map(|value| value.as_bytes().to_vec())
        .unwrap_or_default()
}

/// Sets `header_name` on the response to the token bytes, replacing any
/// previous value.
///
/// Bytes that cannot form a header value are dropped with a warning; the
/// codec only ever produces JSON, so this means the bytes came from an
/// overridden policy.
pub fn write_token_to_header(response: &mut Response, token_bytes: &[u8], header_name: &str) {
    let name = match HeaderName::from_bytes(header_name.as_bytes()) {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(header = header_name, "Invalid token header name: {}", e);
            return;
        }
    };

    match HeaderValue::from_bytes(token_bytes) {
        Ok(value) => {
            response.headers_mut().insert(name, value);
        }
        Err(e) => {
            tracing::warn!(header = header_name, "Token bytes are not a valid header value: {}", e);
        }
    }
}
