//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET/POST /.well-known/apollo/server-health
//!     → optional user callback (database ping, etc.)
//!     → 200 {"status":"pass"} | 503 {"status":"fail"}
//! ```
//!
//! # Design Decisions
//! - No callback configured means always healthy
//! - Callback errors are logged, the client only sees the fixed fail payload
//! - The GraphQL engine is never invoked for this path

pub mod check;

pub use check::{BoxError, HealthCheck, HealthCheckFn, HealthStatus, HEALTH_CHECK_PATH};
