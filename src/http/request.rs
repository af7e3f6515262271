//! Request handling and transformation.
//!
//! # Responsibilities
//! - Read the request body under a size limit
//! - Decode query string and body the way the platform's helpers do
//! - Generate a request ID for every incoming request
//!
//! # Design Decisions
//! - Body decoding never fails: undecodable JSON is kept raw and rejected
//!   later by the query runner with a GraphQL-specific message
//! - Repeated query-string keys become arrays
//! - Request ID added as early as possible for tracing

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method, Request, Uri};
use serde_json::{Map, Value};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::HeaderBag;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request body as decoded by the platform.
pub enum RequestBody {
    /// `application/json`, `application/x-www-form-urlencoded` or `text/plain`.
    Json(Value),
    /// Anything else, including undecodable JSON and untouched multipart.
    Raw(Bytes),
    /// Operations parsed from a multipart upload request.
    Operations(async_graphql::BatchRequest),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Json(value) => f.debug_tuple("Json").field(value).finish(),
            RequestBody::Raw(bytes) => f.debug_tuple("Raw").field(&bytes.len()).finish(),
            RequestBody::Operations(_) => f.write_str("Operations"),
        }
    }
}

/// Error raised while turning an HTTP request into a [`PlatformRequest`].
#[derive(Debug, Error)]
pub enum PlatformRequestError {
    #[error("Request body too large.")]
    BodyTooLarge,
}

/// The platform's view of an incoming request.
#[derive(Debug)]
pub struct PlatformRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderBag,
    /// Decoded query string; empty when the URL has none.
    pub query: Map<String, Value>,
    /// Decoded body; `None` when the request carried no bytes.
    pub body: Option<RequestBody>,
}

impl PlatformRequest {
    /// Read and decode an HTTP request, buffering at most `body_limit` bytes.
    pub async fn from_http(
        request: Request<Body>,
        body_limit: usize,
    ) -> Result<Self, PlatformRequestError> {
        let (parts, body) = request.into_parts();
        let mut request = Self::from_parts(parts);
        request.read_body(body, body_limit).await?;
        Ok(request)
    }

    /// Decode method, URL and headers; the body is left unread.
    pub fn from_parts(parts: Parts) -> Self {
        let headers = HeaderBag::from_header_map(&parts.headers);
        let query = parse_query_string(parts.uri.query().unwrap_or_default());

        Self {
            method: parts.method,
            uri: parts.uri,
            headers,
            query,
            body: None,
        }
    }

    /// Buffer and decode `body`, failing once it exceeds `body_limit` bytes.
    pub async fn read_body(&mut self, body: Body, body_limit: usize) -> Result<(), PlatformRequestError> {
        let bytes = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(|_| PlatformRequestError::BodyTooLarge)?;
        self.body = decode_body(self.content_type(), bytes);
        Ok(())
    }

    /// Path component of the request URL.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Path and query, as the platform reports `req.url`.
    pub fn url(&self) -> String {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE.as_str())
    }
}

/// Decode a query string into a JSON object; repeated keys collect into arrays.
pub fn parse_query_string(query: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match map.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}

fn decode_body(content_type: Option<&str>, bytes: Bytes) -> Option<RequestBody> {
    if bytes.is_empty() {
        return None;
    }

    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let decoded = match essence.as_str() {
        "application/json" => serde_json::from_slice(&bytes).ok(),
        "application/x-www-form-urlencoded" => std::str::from_utf8(&bytes)
            .ok()
            .map(|form| Value::Object(parse_query_string(form))),
        "text/plain" => std::str::from_utf8(&bytes)
            .ok()
            .map(|text| Value::String(text.to_string())),
        _ => None,
    };

    Some(match decoded {
        Some(value) => RequestBody::Json(value),
        None => RequestBody::Raw(bytes),
    })
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
