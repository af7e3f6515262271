//! Platform request dispatcher.
//!
//! # Responsibilities
//! - Turn one platform invocation into exactly one written response
//! - Answer preflight, health-check and Playground requests without the engine
//! - Hand everything else to the upload interceptor and the query bridge
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → PlatformRequest (method, URL, headers)
//!     → OPTIONS?                                      204 + CORS
//!     → /.well-known/apollo/server-health?            200 pass | 503 fail
//!     → GET + Accept text/html + playground enabled?  200 HTML
//!     → body (limit, decoding)                        413 on overflow
//!     → upload interceptor → bridge → run_http_query
//! ```
//!
//! # Design Decisions
//! - Branches are evaluated in a fixed order and each one returns
//! - CORS headers are computed once per request from an immutable policy
//! - The handler is a cheap `Clone` over shared state and a `tower::Service`,
//!   so it mounts directly as an axum fallback service

pub mod bridge;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use futures_util::future::BoxFuture;
use tower::Service;

use crate::config::{HandlerConfig, PlaygroundConfig};
use crate::cors::CorsPolicy;
use crate::graphql::{render_playground, GraphQLOptionsProvider, HttpRequest};
use crate::health::{BoxError, HealthCheck, HEALTH_CHECK_PATH};
use crate::http::response::{respond, respond_text, TEXT_HTML};
use crate::http::{HeaderBag, PlatformRequest};
use crate::upload::UploadInterceptor;

struct Inner<P> {
    provider: P,
    cors: Option<CorsPolicy>,
    health: HealthCheck,
    playground: PlaygroundConfig,
    uploads: UploadInterceptor,
    max_body_size: usize,
}

/// Serverless GraphQL request handler.
pub struct GraphQLHandler<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for GraphQLHandler<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`GraphQLHandler`].
pub struct HandlerBuilder<P> {
    provider: P,
    config: HandlerConfig,
    health: HealthCheck,
}

impl<P: GraphQLOptionsProvider> HandlerBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: HandlerConfig::default(),
            health: HealthCheck::new(),
        }
    }

    pub fn config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a health-check callback; an `Err` makes the check fail.
    pub fn on_health_check<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.health = HealthCheck::from_fn(f);
        self
    }

    pub fn health_check(mut self, health: HealthCheck) -> Self {
        self.health = health;
        self
    }

    pub fn build(self) -> GraphQLHandler<P> {
        let HandlerConfig {
            cors,
            uploads,
            playground,
            max_body_size,
        } = self.config;

        tracing::debug!(
            cors = cors.is_some(),
            uploads = uploads.enabled,
            playground = playground.enabled,
            custom_health_check = self.health.is_custom(),
            "GraphQL handler built"
        );

        GraphQLHandler {
            inner: Arc::new(Inner {
                provider: self.provider,
                cors: cors.as_ref().map(CorsPolicy::new),
                health: self.health,
                playground,
                uploads: UploadInterceptor::new(uploads),
                max_body_size,
            }),
        }
    }
}

impl<P: GraphQLOptionsProvider> GraphQLHandler<P> {
    pub fn builder(provider: P) -> HandlerBuilder<P> {
        HandlerBuilder::new(provider)
    }

    /// Handle one raw platform invocation.
    ///
    /// The body is buffered, under the size limit, only on the
    /// query-execution branch.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let (parts, body) = request.into_parts();
        let mut request = PlatformRequest::from_parts(parts);
        let cors_headers = self.cors_headers(&request.headers);

        if let Some(response) = self.short_circuit(&request, &cors_headers).await {
            return response;
        }

        if let Err(e) = request.read_body(body, self.inner.max_body_size).await {
            tracing::warn!(error = %e, limit = self.inner.max_body_size, "Rejecting request body");
            return respond_text(StatusCode::PAYLOAD_TOO_LARGE, &cors_headers, e.to_string());
        }

        self.execute(request, &cors_headers).await
    }

    /// Route a decoded request to exactly one branch.
    pub async fn dispatch(&self, request: PlatformRequest) -> Response<Body> {
        let cors_headers = self.cors_headers(&request.headers);
        match self.short_circuit(&request, &cors_headers).await {
            Some(response) => response,
            None => self.execute(request, &cors_headers).await,
        }
    }

    // Preflight, health check and Playground, in that order.
    async fn short_circuit(&self, request: &PlatformRequest, cors_headers: &HeaderBag) -> Option<Response<Body>> {
        tracing::debug!(method = %request.method, path = %request.path(), "Dispatching request");

        if request.method == Method::OPTIONS {
            return Some(respond(StatusCode::NO_CONTENT, cors_headers, Body::empty()));
        }

        if request.path() == HEALTH_CHECK_PATH {
            let http_request = HttpRequest::from_platform(request);
            return Some(self.inner.health.respond(http_request, cors_headers).await);
        }

        if self.wants_playground(request) {
            let html = render_playground(request.path(), &self.inner.playground);
            let mut staged = HeaderBag::new().with(header::CONTENT_TYPE.as_str(), TEXT_HTML);
            staged.merge(cors_headers);
            return Some(respond(StatusCode::OK, &staged, html));
        }

        None
    }

    async fn execute(&self, mut request: PlatformRequest, cors_headers: &HeaderBag) -> Response<Body> {
        let http_request = HttpRequest::from_platform(&request);
        let options = self.inner.provider.graphql_options(&http_request);

        if let Err(e) = self.inner.uploads.intercept(&mut request, &options).await {
            return bridge::write_error(e, cors_headers);
        }

        bridge::run(&options, request, cors_headers).await
    }

    /// Mount the handler on every path of an axum router.
    pub fn into_router(self) -> Router {
        Router::new().fallback_service(self)
    }

    fn cors_headers(&self, request_headers: &HeaderBag) -> HeaderBag {
        self.inner
            .cors
            .as_ref()
            .map(|policy| policy.headers_for(request_headers))
            .unwrap_or_default()
    }

    fn wants_playground(&self, request: &PlatformRequest) -> bool {
        self.inner.playground.enabled
            && request.method == Method::GET
            && request
                .headers
                .get(header::ACCEPT.as_str())
                .is_some_and(|accept| accept.contains(TEXT_HTML))
    }
}

impl<P: GraphQLOptionsProvider> Service<Request<Body>> for GraphQLHandler<P> {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response<Body>, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}
