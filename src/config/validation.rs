//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check that CORS tokens are usable header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::{CorsConfig, HeaderList, OriginPolicy, ServerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_level `{0}` is not a valid filter")]
    InvalidLogLevel(String),

    #[error("handler.max_body_size must be greater than zero")]
    ZeroBodySize,

    #[error("handler.uploads.{0} must be greater than zero")]
    ZeroUploadLimit(&'static str),

    #[error("handler.cors.{field} contains an invalid header token `{value}`")]
    InvalidCorsToken { field: &'static str, value: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let handler = &config.handler;
    if handler.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }
    if handler.uploads.max_file_size == Some(0) {
        errors.push(ValidationError::ZeroUploadLimit("max_file_size"));
    }
    if handler.uploads.max_files == Some(0) {
        errors.push(ValidationError::ZeroUploadLimit("max_files"));
    }

    if let Some(cors) = &handler.cors {
        validate_cors(cors, &mut errors);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_cors(cors: &CorsConfig, errors: &mut Vec<ValidationError>) {
    let lists = [
        ("methods", &cors.methods),
        ("allowed_headers", &cors.allowed_headers),
        ("exposed_headers", &cors.exposed_headers),
    ];
    for (field, list) in lists {
        if let Some(value) = list.as_ref().and_then(HeaderList::joined) {
            check_header_value(field, &value, errors);
        }
    }

    match &cors.origin {
        Some(OriginPolicy::Exact(origin)) => check_header_value("origin", origin, errors),
        Some(OriginPolicy::List(origins)) => {
            for origin in origins {
                check_header_value("origin", origin, errors);
            }
        }
        _ => {}
    }
}

fn check_header_value(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if axum::http::HeaderValue::from_str(value).is_err() {
        errors.push(ValidationError::InvalidCorsToken {
            field,
            value: value.to_string(),
        });
    }
}
