//! Response construction.
//!
//! # Responsibilities
//! - Write status, staged headers and body into an outgoing response
//! - Provide the fixed JSON/text/HTML shapes the dispatcher emits
//!
//! # Design Decisions
//! - Staged headers go through the header writer, so invalid entries are skipped
//! - A response that cannot be built degrades to a bare 500, never a panic

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use serde::Serialize;

use crate::http::headers::{set_headers, HeaderBag};

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";

/// Build a response from a status, staged headers and a body.
pub fn respond(status: StatusCode, headers: &HeaderBag, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    set_headers(response.headers_mut(), headers);
    response
}

/// Respond with `value` serialized as JSON.
pub fn respond_json<T: Serialize>(status: StatusCode, headers: &HeaderBag, value: &T) -> Response<Body> {
    match serde_json::to_string(value) {
        Ok(json) => {
            let mut staged = HeaderBag::new().with(header::CONTENT_TYPE.as_str(), APPLICATION_JSON);
            staged.merge(headers);
            respond(status, &staged, json)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            internal_error()
        }
    }
}

/// Respond with a plain-text message.
pub fn respond_text(status: StatusCode, headers: &HeaderBag, message: impl Into<String>) -> Response<Body> {
    let mut staged = HeaderBag::new().with(header::CONTENT_TYPE.as_str(), TEXT_PLAIN);
    staged.merge(headers);
    respond(status, &staged, message.into())
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
