//! Health-check callback and response.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::graphql::HttpRequest;
use crate::http::response::respond_json;
use crate::http::HeaderBag;

/// Fixed path answered by the health check.
pub const HEALTH_CHECK_PATH: &str = "/.well-known/apollo/server-health";

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Async health-check callback; an `Err` reports the service as failing.
pub type HealthCheckFn = Arc<dyn Fn(HttpRequest) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Outcome reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Pass,
    Fail,
}

impl HealthStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Pass => StatusCode::OK,
            HealthStatus::Fail => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: HealthStatus,
}

/// Health check with an optional user callback.
#[derive(Clone, Default)]
pub struct HealthCheck {
    callback: Option<HealthCheckFn>,
}

impl HealthCheck {
    /// A health check that always passes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fn<F, Fut, E>(f: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let callback: HealthCheckFn = Arc::new(move |request| -> BoxFuture<'static, Result<(), BoxError>> {
            let fut = f(request);
            Box::pin(async move { fut.await.map_err(Into::into) })
        });
        Self {
            callback: Some(callback),
        }
    }

    pub fn is_custom(&self) -> bool {
        self.callback.is_some()
    }

    /// Run the callback. Failure details are logged, never returned.
    pub async fn check(&self, request: HttpRequest) -> HealthStatus {
        let Some(callback) = &self.callback else {
            return HealthStatus::Pass;
        };
        match callback(request).await {
            Ok(()) => HealthStatus::Pass,
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                HealthStatus::Fail
            }
        }
    }

    /// Run the check and build the JSON response, with `headers` attached.
    pub async fn respond(&self, request: HttpRequest, headers: &HeaderBag) -> Response<Body> {
        let status = self.check(request).await;
        respond_json(status.status_code(), headers, &HealthBody { status })
    }
}

impl std::fmt::Debug for HealthCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheck")
            .field("custom", &self.is_custom())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: HEALTH_CHECK_PATH.into(),
            headers: HeaderBag::new(),
        }
    }

    async fn body_of(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_without_callback_passes() {
        let response = HealthCheck::new().respond(request(), &HeaderBag::new()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, r#"{"status":"pass"}"#);
    }

    #[tokio::test]
    async fn test_callback_success_and_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let check = HealthCheck::from_fn(move |_request| {
            let n = seen.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 { Ok(()) } else { Err("database unreachable") }
            }
        });

        assert_eq!(check.check(request()).await, HealthStatus::Pass);

        let response = check.respond(request(), &HeaderBag::new()).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_of(response).await;
        assert_eq!(body, r#"{"status":"fail"}"#);
        assert!(!body.contains("database"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
