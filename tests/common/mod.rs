//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use async_graphql::{Context, EmptySubscription, Object, Schema, Upload};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use tokio::net::TcpListener;
use tower::ServiceExt;

use graphql_vercel::config::{HandlerConfig, TimeoutConfig};
use graphql_vercel::upload::{FileMetadata, UploadPlaceholder};
use graphql_vercel::{GraphQLHandler, GraphQLServer, HttpServer, Shutdown};

pub const MULTIPART_BOUNDARY: &str = "graphql-vercel-test-boundary";

/// Value attached to each operation by the context hook in [`context_server`].
pub struct Caller(pub String);

pub struct Query;

#[Object]
impl Query {
    async fn test_string(&self) -> String {
        "it works".to_string()
    }

    async fn test_argument(&self, echo: String) -> String {
        format!("hello {}", echo)
    }

    async fn test_error(&self) -> async_graphql::Result<String> {
        Err("secret resolver failure".into())
    }

    async fn caller(&self, ctx: &Context<'_>) -> Option<String> {
        ctx.data_opt::<Caller>().map(|caller| caller.0.clone())
    }
}

pub struct Mutation;

#[Object]
impl Mutation {
    async fn test_mutation(&self, echo: String) -> String {
        format!("not really a mutation, but who cares: {}", echo)
    }

    async fn single_upload(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<FileMetadata> {
        Ok(UploadPlaceholder::resolve(ctx, &file)?.metadata())
    }

    async fn multiple_upload(&self, ctx: &Context<'_>, files: Vec<Upload>) -> async_graphql::Result<Vec<FileMetadata>> {
        files
            .iter()
            .map(|file| -> async_graphql::Result<FileMetadata> {
                Ok(UploadPlaceholder::resolve(ctx, file)?.metadata())
            })
            .collect()
    }

    async fn upload_contents(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<String> {
        use tokio::io::AsyncReadExt;

        let mut contents = String::new();
        UploadPlaceholder::resolve(ctx, &file)?
            .create_read_stream()
            .read_to_string(&mut contents)
            .await?;
        Ok(contents)
    }
}

pub type TestSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn schema() -> TestSchema {
    Schema::new(Query, Mutation, EmptySubscription)
}

pub fn server() -> GraphQLServer<TestSchema> {
    GraphQLServer::new(schema())
}

/// Server whose context hook copies `x-caller` into the operation data.
pub fn context_server() -> GraphQLServer<TestSchema> {
    server().context(|request, http_request| {
        let caller = http_request.headers.get("x-caller").unwrap_or("anonymous").to_string();
        request.data(Caller(caller))
    })
}

pub fn handler(config: HandlerConfig) -> GraphQLHandler<GraphQLServer<TestSchema>> {
    GraphQLHandler::builder(server()).config(config).build()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Drive one request through the handler in process.
pub async fn send<P>(handler: &GraphQLHandler<P>, request: Request<Body>) -> TestResponse
where
    P: graphql_vercel::GraphQLOptionsProvider,
{
    let response = handler.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// A file part for [`multipart_body`].
pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub contents: &'a str,
}

/// Build a GraphQL multipart request body; file `i` is form field `i`.
pub fn multipart_body(operations: &serde_json::Value, map: &serde_json::Value, files: &[FilePart<'_>]) -> String {
    let mut body = String::new();
    for (name, value) in [("operations", operations), ("map", map)] {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    for (index, file) in files.iter().enumerate() {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{index}\"; filename=\"{}\"\r\n\
             Content-Type: {}\r\n\r\n{}\r\n",
            file.filename, file.content_type, file.contents
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    body
}

pub fn post_multipart(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Serve `handler` on an ephemeral port. Trigger the returned [`Shutdown`] to stop it.
pub async fn start_server<P>(handler: GraphQLHandler<P>) -> (SocketAddr, Shutdown)
where
    P: graphql_vercel::GraphQLOptionsProvider,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&TimeoutConfig::default(), handler);
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });
    (addr, shutdown)
}
