//! HTTP query runner.
//!
//! # Responsibilities
//! - Validate the request shape (method, presence of a query source)
//! - Turn the query source into async-graphql operations
//! - Execute them and serialize the result, or raise an [`HttpQueryError`]
//!
//! # Design Decisions
//! - Request-level GraphQL errors (parse/validation: no data, no error paths)
//!   on a non-batched request are a 400; execution errors stay 200
//! - Persisted-query protocol errors stay 200 so clients retry with the query
//! - Batched operations execute concurrently; results keep request order

use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use async_graphql::{BatchRequest, Executor, Request, Response, ServerError, Variables};
use axum::body::Bytes;
use axum::http::{header, Method, StatusCode};
use futures_util::future::join_all;
use serde_json::Value;
use thiserror::Error;

use crate::graphql::options::GraphQLOptions;
use crate::http::response::APPLICATION_JSON;
use crate::http::{HeaderBag, PlatformRequest};

const PERSISTED_QUERY_EXTENSION: &str = "persistedQuery";
const PERSISTED_QUERY_PROTOCOL_ERRORS: [&str; 2] =
    ["PersistedQueryNotFound", "PersistedQueryNotSupported"];

/// Engine-facing view of the incoming HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderBag,
}

impl HttpRequest {
    pub fn from_platform(request: &PlatformRequest) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url(),
            headers: request.headers.clone(),
        }
    }
}

/// Where the GraphQL payload comes from.
pub enum QuerySource {
    /// Decoded JSON: a body object/array/string or the query-string map.
    Json(Value),
    /// An undecoded body.
    Raw(Bytes),
    /// Operations already extracted from a multipart request.
    Operations(BatchRequest),
}

/// Input to [`run_http_query`].
pub struct HttpQueryRequest {
    pub method: Method,
    pub query: Option<QuerySource>,
    pub request: HttpRequest,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseInit {
    pub headers: HeaderBag,
}

/// Successful outcome: the serialized GraphQL response plus headers to send.
#[derive(Debug, Clone)]
pub struct HttpQueryResponse {
    pub graphql_response: String,
    pub response_init: ResponseInit,
}

/// A query failure carrying the HTTP status, headers and body to send.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HttpQueryError {
    pub status: StatusCode,
    pub headers: HeaderBag,
    pub message: String,
    /// `message` is a serialized `{"errors": [...]}` document.
    pub is_graphql_error: bool,
}

impl HttpQueryError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderBag::new(),
            message: message.into(),
            is_graphql_error: false,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// An error whose body is a GraphQL `errors` document.
    pub fn graphql(status: StatusCode, errors: &[ServerError]) -> Self {
        let body = serde_json::json!({ "errors": errors });
        Self {
            status,
            headers: HeaderBag::new().with(header::CONTENT_TYPE.as_str(), APPLICATION_JSON),
            message: body.to_string(),
            is_graphql_error: true,
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

/// Run one HTTP GraphQL request against the engine.
pub async fn run_http_query<E: Executor>(
    options: &GraphQLOptions<E>,
    request: HttpQueryRequest,
) -> Result<HttpQueryResponse, HttpQueryError> {
    let is_get = match request.method {
        Method::GET => true,
        Method::POST => false,
        _ => {
            return Err(HttpQueryError::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "Apollo Server supports only GET/POST requests.",
            )
            .with_header(header::ALLOW.as_str(), "GET, POST"));
        }
    };

    let source = match request.query {
        Some(QuerySource::Json(Value::Object(map))) if is_get && map.is_empty() => None,
        other => other,
    };
    let source = match source {
        Some(source) => source,
        None if is_get => return Err(HttpQueryError::bad_request("GET query missing.")),
        None => {
            return Err(HttpQueryError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "POST body missing.",
            ));
        }
    };

    let (operations, is_batch) = match source {
        QuerySource::Operations(BatchRequest::Single(operation)) => (vec![operation], false),
        QuerySource::Operations(BatchRequest::Batch(operations)) => (operations, true),
        QuerySource::Raw(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|_| HttpQueryError::bad_request("POST body sent invalid JSON."))?;
            parse_payload(value)?
        }
        QuerySource::Json(Value::String(text)) => {
            let value = serde_json::from_str(&text)
                .map_err(|_| HttpQueryError::bad_request("POST body sent invalid JSON."))?;
            parse_payload(value)?
        }
        QuerySource::Json(value) => parse_payload(value)?,
    };

    if is_batch {
        if !options.allow_batched_requests {
            return Err(HttpQueryError::bad_request("Operation batching disabled."));
        }
        if operations.is_empty() {
            return Err(HttpQueryError::bad_request("No operations found in request."));
        }
    }

    if is_get {
        for operation in &operations {
            ensure_query_operation(operation)?;
        }
    }

    tracing::debug!(
        method = %request.method,
        operations = operations.len(),
        batched = is_batch,
        "Executing GraphQL request"
    );

    let executions = operations
        .into_iter()
        .map(|operation| options.prepare(operation, &request.request))
        .map(|operation| options.executor.execute(operation));
    let responses: Vec<Response> = join_all(executions)
        .await
        .into_iter()
        .map(|response| format_response(options, response))
        .collect();

    let mut headers = HeaderBag::new().with(header::CONTENT_TYPE.as_str(), APPLICATION_JSON);
    for response in &responses {
        for (name, value) in response.http_headers.iter() {
            if let Ok(value) = value.to_str() {
                headers.set(name.as_str(), value);
            }
        }
    }
    if let Some(cache_control) = shared_cache_control(&responses) {
        headers.set(header::CACHE_CONTROL.as_str(), cache_control);
    }

    let serialized = if is_batch {
        serde_json::to_string(&responses)
    } else {
        let response = responses
            .first()
            .ok_or_else(|| HttpQueryError::bad_request("No operations found in request."))?;
        if is_request_error(response) {
            return Err(HttpQueryError::graphql(StatusCode::BAD_REQUEST, &response.errors));
        }
        serde_json::to_string(response)
    };

    let graphql_response = serialized.map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize GraphQL response");
        HttpQueryError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    Ok(HttpQueryResponse {
        graphql_response,
        response_init: ResponseInit { headers },
    })
}

fn parse_payload(value: Value) -> Result<(Vec<Request>, bool), HttpQueryError> {
    match value {
        Value::Array(items) => {
            let operations = items
                .into_iter()
                .map(parse_operation)
                .collect::<Result<Vec<_>, _>>()?;
            Ok((operations, true))
        }
        other => Ok((vec![parse_operation(other)?], false)),
    }
}

fn parse_operation(value: Value) -> Result<Request, HttpQueryError> {
    let Value::Object(mut payload) = value else {
        return Err(HttpQueryError::bad_request(
            "GraphQL request payload must be a JSON object.",
        ));
    };

    let variables = decode_json_field(payload.remove("variables"), "Variables are invalid JSON.")?;
    let extensions =
        decode_json_field(payload.remove("extensions"), "Extensions are invalid JSON.")?;
    let operation_name = match payload.remove("operationName") {
        Some(Value::String(name)) => Some(name),
        _ => None,
    };

    let has_persisted_query = matches!(
        &extensions,
        Some(Value::Object(ext)) if ext.contains_key(PERSISTED_QUERY_EXTENSION)
    );
    let query = match payload.remove("query") {
        Some(Value::String(query)) => query,
        None | Some(Value::Null) if has_persisted_query => String::new(),
        None | Some(Value::Null) => {
            return Err(HttpQueryError::bad_request("Must provide query string."));
        }
        Some(_) => {
            return Err(HttpQueryError::bad_request(
                "GraphQL queries must be strings. Send the query text, not a parsed document.",
            ));
        }
    };

    let mut request = Request::new(query);
    if let Some(name) = operation_name {
        request = request.operation_name(name);
    }
    if let Some(variables) = variables {
        request = request.variables(Variables::from_json(variables));
    }
    if let Some(Value::Object(extensions)) = extensions {
        for (name, value) in extensions {
            let value = async_graphql::Value::from_json(value)
                .map_err(|_| HttpQueryError::bad_request("Extensions are invalid JSON."))?;
            request.extensions.insert(name, value);
        }
    }
    Ok(request)
}

// Fields such as `variables` may arrive as JSON text (always so over GET).
fn decode_json_field(field: Option<Value>, message: &str) -> Result<Option<Value>, HttpQueryError> {
    match field {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|_| HttpQueryError::bad_request(message)),
        Some(value) => Ok(Some(value)),
    }
}

fn ensure_query_operation(operation: &Request) -> Result<(), HttpQueryError> {
    if operation.query.is_empty() {
        return Ok(());
    }
    // Unparseable documents are reported by the engine.
    let Ok(document) = parse_query(&operation.query) else {
        return Ok(());
    };

    let selected = match &document.operations {
        DocumentOperations::Single(definition) => Some(definition.node.ty),
        DocumentOperations::Multiple(definitions) => operation
            .operation_name
            .as_deref()
            .and_then(|wanted| {
                definitions
                    .iter()
                    .find(|(name, _)| name.as_str() == wanted)
            })
            .map(|(_, definition)| definition.node.ty),
    };

    match selected {
        Some(ty) if ty != OperationType::Query => Err(HttpQueryError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "GET supports only query operation",
        )
        .with_header(header::ALLOW.as_str(), "POST")),
        _ => Ok(()),
    }
}

fn format_response<E>(options: &GraphQLOptions<E>, mut response: Response) -> Response {
    if options.format_error.is_some() {
        response.errors = response
            .errors
            .into_iter()
            .map(|error| options.format_error(error))
            .collect();
    }
    response
}

fn is_request_error(response: &Response) -> bool {
    matches!(response.data, async_graphql::Value::Null)
        && !response.errors.is_empty()
        && response.errors.iter().all(|error| error.path.is_empty())
        && !response
            .errors
            .iter()
            .any(|error| PERSISTED_QUERY_PROTOCOL_ERRORS.contains(&error.message.as_str()))
}

// Only emitted when every operation agrees on the same policy.
fn shared_cache_control(responses: &[Response]) -> Option<String> {
    let mut values = responses.iter().map(|response| response.cache_control.value());
    let first = values.next()??;
    values
        .all(|value| value.as_deref() == Some(first.as_str()))
        .then_some(first)
}
