//! CORS header negotiation.
//!
//! # Data Flow
//! ```text
//! CorsConfig (static, handler construction)
//!     → policy.rs precomputes the request-independent headers once
//!
//! Per request:
//!     request HeaderBag (Origin, Access-Control-Request-Headers)
//!     → clone of the static headers
//!     → origin echo / request-headers reflection
//!     → HeaderBag merged into whatever response the dispatcher writes
//! ```
//!
//! # Design Decisions
//! - No rejection: a disallowed origin just gets no Allow-Origin header
//! - Static headers are never mutated after construction

mod policy;

pub use policy::CorsPolicy;

pub mod header {
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
    pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
    pub const ACCESS_CONTROL_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";
    pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "Access-Control-Allow-Credentials";
    pub const ACCESS_CONTROL_EXPOSE_HEADERS: &str = "Access-Control-Expose-Headers";
    pub const ACCESS_CONTROL_MAX_AGE: &str = "Access-Control-Max-Age";
    pub const ACCESS_CONTROL_REQUEST_HEADERS: &str = "Access-Control-Request-Headers";
    pub const ORIGIN: &str = "Origin";
    pub const VARY: &str = "Vary";
}
