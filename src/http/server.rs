//! Local HTTP server.
//!
//! # Responsibilities
//! - Mount the GraphQL handler on every path (the platform routes externally)
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown broadcast fires
//!
//! # Design Decisions
//! - Development and test harness only; in production the platform invokes
//!   the handler directly
//! - Layers match what the platform provides: one ID per request, a hard deadline

use std::time::Duration;

use axum::http::HeaderName;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::TimeoutConfig;
use crate::graphql::GraphQLOptionsProvider;
use crate::handler::GraphQLHandler;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};

/// HTTP server wrapping a [`GraphQLHandler`].
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new<P: GraphQLOptionsProvider>(timeouts: &TimeoutConfig, handler: GraphQLHandler<P>) -> Self {
        Self {
            router: Self::build_router(timeouts, handler),
        }
    }

    #[allow(deprecated)]
    fn build_router<P: GraphQLOptionsProvider>(timeouts: &TimeoutConfig, handler: GraphQLHandler<P>) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        handler.into_router().layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs)))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
    }

    /// The router with all layers applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
