//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! platform invocation (Request<Body>)
//!     → request.rs (read body, decode query/body, request ID)
//!     → [dispatcher decides the branch]
//!     → headers.rs (stage headers in a HeaderBag)
//!     → response.rs (write status, headers, body)
//!     → Response<Body> back to the platform
//!
//! Local development:
//!     server.rs (axum + tower-http layers) → same handler for every path
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use headers::{set_headers, HeaderBag};
pub use request::{PlatformRequest, PlatformRequestError, RequestBody, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
