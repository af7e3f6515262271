//! GraphQL execution options and their providers.
//!
//! # Responsibilities
//! - Bundle what the query runner needs from the engine side: an executor,
//!   a per-request context hook, an error formatter and the batching switch
//! - Produce those options per request through [`GraphQLOptionsProvider`]
//!
//! # Design Decisions
//! - The handler holds a provider; it does not extend a server type
//! - Executors are cheap to clone (async-graphql schemas are `Arc`s inside)

use std::sync::Arc;

use async_graphql::{Executor, Request, ServerError};

use crate::config::HandlerConfig;
use crate::graphql::query::HttpRequest;
use crate::handler::HandlerBuilder;

/// Hook run on every operation before execution, e.g. to attach context data.
pub type ContextFn = Arc<dyn Fn(Request, &HttpRequest) -> Request + Send + Sync>;

/// Hook applied to every error before it is serialized.
pub type FormatErrorFn = Arc<dyn Fn(ServerError) -> ServerError + Send + Sync>;

/// Options for a single GraphQL request.
pub struct GraphQLOptions<E> {
    pub executor: E,
    pub context: Option<ContextFn>,
    pub format_error: Option<FormatErrorFn>,
    pub allow_batched_requests: bool,
}

impl<E> GraphQLOptions<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            context: None,
            format_error: None,
            allow_batched_requests: true,
        }
    }

    /// Run the error formatter, if any.
    pub fn format_error(&self, error: ServerError) -> ServerError {
        match &self.format_error {
            Some(format) => format(error),
            None => error,
        }
    }

    /// Run the context hook, if any.
    pub fn prepare(&self, request: Request, http_request: &HttpRequest) -> Request {
        match &self.context {
            Some(context) => context(request, http_request),
            None => request,
        }
    }
}

/// Produces [`GraphQLOptions`] for a given request.
pub trait GraphQLOptionsProvider: Send + Sync + 'static {
    type Executor: Executor;

    fn graphql_options(&self, request: &HttpRequest) -> GraphQLOptions<Self::Executor>;
}

/// Default provider wrapping an async-graphql executor such as a `Schema`.
#[derive(Clone)]
pub struct GraphQLServer<E> {
    executor: E,
    context: Option<ContextFn>,
    format_error: Option<FormatErrorFn>,
    allow_batched_requests: bool,
}

impl<E: Executor> GraphQLServer<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            context: None,
            format_error: None,
            allow_batched_requests: true,
        }
    }

    /// Attach per-request context to each operation.
    pub fn context<F>(mut self, f: F) -> Self
    where
        F: Fn(Request, &HttpRequest) -> Request + Send + Sync + 'static,
    {
        self.context = Some(Arc::new(f));
        self
    }

    /// Rewrite errors before they reach the client.
    pub fn format_error<F>(mut self, f: F) -> Self
    where
        F: Fn(ServerError) -> ServerError + Send + Sync + 'static,
    {
        self.format_error = Some(Arc::new(f));
        self
    }

    pub fn allow_batched_requests(mut self, allow: bool) -> Self {
        self.allow_batched_requests = allow;
        self
    }

    /// Start building a handler around this server.
    pub fn create_handler(self, config: HandlerConfig) -> HandlerBuilder<Self> {
        HandlerBuilder::new(self).config(config)
    }
}

impl<E: Executor> GraphQLOptionsProvider for GraphQLServer<E> {
    type Executor = E;

    fn graphql_options(&self, _request: &HttpRequest) -> GraphQLOptions<E> {
        GraphQLOptions {
            executor: self.executor.clone(),
            context: self.context.clone(),
            format_error: self.format_error.clone(),
            allow_batched_requests: self.allow_batched_requests,
        }
    }
}
