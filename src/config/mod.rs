//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → HandlerConfig handed to the handler builder once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the handler captures it at construction
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CorsConfig, HandlerConfig, HeaderList, ListenerConfig, LogFormat, ObservabilityConfig,
    OriginPolicy, PlaygroundConfig, ServerConfig, TimeoutConfig, UploadConfig,
};
pub use validation::{validate_config, ValidationError};
