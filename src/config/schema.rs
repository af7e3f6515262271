//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the handler
//! and the local development server. All types derive Serde traits for
//! deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration for local serving.
    pub listener: ListenerConfig,

    /// Timeout configuration for local serving.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Handler settings (CORS, uploads, playground).
    pub handler: HandlerConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds (mirrors the platform's invocation limit).
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format; JSON for production, pretty for development.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Settings consumed by the request dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// CORS policy. `None` emits no CORS headers.
    pub cors: Option<CorsConfig>,

    /// Multipart upload handling.
    pub uploads: UploadConfig,

    /// GraphQL Playground page.
    pub playground: PlaygroundConfig,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            cors: None,
            uploads: UploadConfig::default(),
            playground: PlaygroundConfig::default(),
            max_body_size: 4_500_000, // platform request body cap
        }
    }
}

/// Allowed-origin policy: `true`, a literal origin, or a list of origins.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OriginPolicy {
    Reflect(bool),
    Exact(String),
    List(Vec<String>),
}

/// A header value configured either as a preformatted string or a list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HeaderList {
    Single(String),
    Many(Vec<String>),
}

impl HeaderList {
    /// The header value to emit, or `None` when nothing is configured.
    pub fn joined(&self) -> Option<String> {
        let value = match self {
            HeaderList::Single(value) => value.clone(),
            HeaderList::Many(values) => values.join(","),
        };
        if value.is_empty() { None } else { Some(value) }
    }
}

impl From<&str> for HeaderList {
    fn from(value: &str) -> Self {
        HeaderList::Single(value.to_string())
    }
}

impl From<Vec<&str>> for HeaderList {
    fn from(values: Vec<&str>) -> Self {
        HeaderList::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed-origin policy.
    pub origin: Option<OriginPolicy>,

    /// Value for `Access-Control-Allow-Methods`.
    pub methods: Option<HeaderList>,

    /// Value for `Access-Control-Allow-Headers`.
    pub allowed_headers: Option<HeaderList>,

    /// Value for `Access-Control-Expose-Headers`.
    pub exposed_headers: Option<HeaderList>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub credentials: bool,

    /// Value for `Access-Control-Max-Age`, in seconds.
    pub max_age: Option<u64>,
}

/// Multipart upload configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Parse `multipart/form-data` requests.
    pub enabled: bool,

    /// Maximum size of a single file in bytes.
    pub max_file_size: Option<usize>,

    /// Maximum number of files per request.
    pub max_files: Option<usize>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_file_size: None,
            max_files: None,
        }
    }
}

/// GraphQL Playground configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Serve the Playground to browsers.
    pub enabled: bool,

    /// Page title.
    pub title: Option<String>,

    /// Playground settings, e.g. `"editor.theme" = "light"`.
    pub settings: BTreeMap<String, String>,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: None,
            settings: BTreeMap::new(),
        }
    }
}
