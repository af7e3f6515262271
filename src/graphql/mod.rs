//! GraphQL engine integration.
//!
//! # Data Flow
//! ```text
//! HttpRequest (method, url, headers) + QuerySource
//!     → options.rs (provider yields executor, context hook, error formatter)
//!     → query.rs (shape checks, operations, execution, serialization)
//!     → HttpQueryResponse | HttpQueryError
//!
//! playground.rs renders the explorer page for browsers.
//! ```
//!
//! # Design Decisions
//! - Execution semantics belong to async-graphql; this module only enforces
//!   the HTTP transport rules around it
//! - Errors carry their own status, headers and body so callers write them verbatim

pub mod options;
pub mod playground;
pub mod query;

pub use options::{ContextFn, FormatErrorFn, GraphQLOptions, GraphQLOptionsProvider, GraphQLServer};
pub use playground::render_playground;
pub use query::{
    run_http_query, HttpQueryError, HttpQueryRequest, HttpQueryResponse, HttpRequest, QuerySource,
    ResponseInit,
};
