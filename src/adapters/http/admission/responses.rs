//! Default responses produced by admission.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use super::carrier::RequestHead;
use super::error::AdmissionError;

/// `302 Found` pointing at `host`.
///
/// The default service checks targets before calling this. A custom
/// response builder that passes an unrepresentable host still gets a 500
/// rather than a malformed header.
pub fn redirect_response(_head: &RequestHead, host: &str) -> Response {
    match HeaderValue::from_str(host) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::warn!(host, "Redirect target is not a valid Location header");
            plain_text_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid redirect target")
        }
    }
}

/// `400 Bad Request` with the error text as body.
pub fn malformed_token_response(err: &AdmissionError) -> Response {
    plain_text_error(StatusCode::BAD_REQUEST, &err.to_string())
}

/// `500 Internal Server Error` with the error text as body.
pub fn internal_error_response(err: &AdmissionError) -> Response {
    plain_text_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
}

/// Plain-text error body terminated by a newline.
pub fn plain_text_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        format!("{}\n", message),
    )
        .into_response()
}
