//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher, upload interceptor, query runner, local server
//!     → tracing events with structured fields
//!     → logging.rs (EnvFilter + pretty or JSON formatter)
//!     → stdout (collected by the platform's log drain)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing in production
//! - `RUST_LOG` overrides the configured level
//! - Request ID is attached by the local server's tower-http layers

pub mod logging;

pub use logging::{init_logging, LoggingError};
