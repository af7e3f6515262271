//! Bridge between the platform request and the HTTP query runner.

use async_graphql::Executor;
use axum::body::Body;
use axum::http::{Method, Response, StatusCode};
use serde_json::Value;

use crate::graphql::{run_http_query, GraphQLOptions, HttpQueryError, HttpQueryRequest, HttpRequest, QuerySource};
use crate::http::response::{respond, respond_text};
use crate::http::{HeaderBag, PlatformRequest, RequestBody};

impl From<RequestBody> for QuerySource {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Json(value) => QuerySource::Json(value),
            RequestBody::Raw(bytes) => QuerySource::Raw(bytes),
            RequestBody::Operations(batch) => QuerySource::Operations(batch),
        }
    }
}

/// Execute `request` and write the result. `headers` (CORS) are applied
/// first so headers produced by the query runner win on conflict.
pub async fn run<E: Executor>(
    options: &GraphQLOptions<E>,
    request: PlatformRequest,
    headers: &HeaderBag,
) -> Response<Body> {
    if request.method == Method::POST && request.body.as_ref().map_or(true, is_empty_body) {
        return respond_text(StatusCode::INTERNAL_SERVER_ERROR, headers, "POST body missing.");
    }

    let http_request = HttpRequest::from_platform(&request);
    let PlatformRequest { method, query, body, .. } = request;
    let source = if method == Method::POST {
        body.map(QuerySource::from)
    } else {
        Some(QuerySource::Json(Value::Object(query)))
    };

    let query_request = HttpQueryRequest {
        method,
        query: source,
        request: http_request,
    };

    match run_http_query(options, query_request).await {
        Ok(response) => {
            let mut staged = headers.clone();
            staged.merge(&response.response_init.headers);
            respond(StatusCode::OK, &staged, response.graphql_response)
        }
        Err(e) => write_error(e, headers),
    }
}

// A falsy JSON body (`null`, `false`, `0`, `""`) counts as absent.
fn is_empty_body(body: &RequestBody) -> bool {
    match body {
        RequestBody::Json(Value::Null) | RequestBody::Json(Value::Bool(false)) => true,
        RequestBody::Json(Value::Number(n)) => n.as_f64() == Some(0.0),
        RequestBody::Json(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Write a query error: its status, its headers over `headers`, its message verbatim.
pub fn write_error(error: HttpQueryError, headers: &HeaderBag) -> Response<Body> {
    tracing::debug!(status = %error.status, graphql = error.is_graphql_error, "GraphQL request failed");

    let mut staged = headers.clone();
    staged.merge(&error.headers);
    if error.is_graphql_error {
        respond(error.status, &staged, error.message)
    } else {
        respond_text(error.status, &staged, error.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{EmptyMutation, EmptySubscription, Object, Schema};
    use axum::http::{header, Uri};

    struct Query;

    #[Object]
    impl Query {
        async fn test_string(&self) -> String {
            "it works".to_string()
        }
    }

    fn options() -> GraphQLOptions<Schema<Query, EmptyMutation, EmptySubscription>> {
        GraphQLOptions::new(Schema::new(Query, EmptyMutation, EmptySubscription))
    }

    fn request(method: Method, uri: &'static str, body: Option<RequestBody>) -> PlatformRequest {
        let uri = Uri::from_static(uri);
        let query = crate::http::request::parse_query_string(uri.query().unwrap_or_default());
        PlatformRequest {
            method,
            uri,
            headers: HeaderBag::new(),
            query,
            body,
        }
    }

    async fn body_of(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_without_body_is_500() {
        let response = run(&options(), request(Method::POST, "/", None), &HeaderBag::new()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, "POST body missing.");
    }

    #[tokio::test]
    async fn test_falsy_json_body_counts_as_missing() {
        for value in [Value::Null, Value::Bool(false), serde_json::json!(0)] {
            let body = Some(RequestBody::Json(value));
            let response = run(&options(), request(Method::POST, "/", body), &HeaderBag::new()).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body_of(response).await, "POST body missing.");
        }
    }

    #[tokio::test]
    async fn test_get_reads_query_string() {
        let response = run(
            &options(),
            request(Method::GET, "/?query=%7B%20testString%20%7D", None),
            &HeaderBag::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, r#"{"data":{"testString":"it works"}}"#);
    }

    #[tokio::test]
    async fn test_get_ignores_body() {
        let body = RequestBody::Json(serde_json::json!({"query": "{ testString }"}));
        let response = run(&options(), request(Method::GET, "/", Some(body)), &HeaderBag::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_of(response).await.contains("GET query missing."));
    }

    #[tokio::test]
    async fn test_engine_headers_override_staged_headers() {
        let body = RequestBody::Json(serde_json::json!({"query": "{ testString }"}));
        let staged = HeaderBag::new()
            .with("Content-Type", "text/plain")
            .with("Access-Control-Allow-Origin", "*");
        let response = run(&options(), request(Method::POST, "/", Some(body)), &staged).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_error_headers_and_message_written_verbatim() {
        let error = HttpQueryError::new(StatusCode::METHOD_NOT_ALLOWED, "nope").with_header("Allow", "POST");
        let response = write_error(error, &HeaderBag::new());
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(body_of(response).await, "nope");
    }
}
