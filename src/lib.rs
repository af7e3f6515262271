//! Serverless GraphQL handler for Vercel-style platforms.
//!
//! Wraps an async-graphql executor in a single HTTP handler that answers
//! CORS preflight, the health check and the Playground page itself and
//! forwards every other request (multipart uploads included) to the engine.

pub mod config;
pub mod cors;
pub mod graphql;
pub mod handler;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upload;

pub use config::schema::{HandlerConfig, ServerConfig};
pub use graphql::{GraphQLOptions, GraphQLOptionsProvider, GraphQLServer};
pub use handler::{GraphQLHandler, HandlerBuilder};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
