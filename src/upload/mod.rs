//! Multipart upload interception.
//!
//! # Data Flow
//! ```text
//! PlatformRequest
//!     → Content-Type multipart/form-data? (otherwise untouched)
//!     → GraphQL multipart request (operations, map, files)
//!     → body replaced by parsed operations with Upload values in place
//!     → query runner
//! ```
//!
//! # Design Decisions
//! - The interceptor never executes anything; it only rewrites the body
//! - Parse failures go through the engine's error formatter and fail the request
//! - Oversized files/parts are 413, every other parse failure is 400

mod placeholder;

use async_graphql::http::{receive_batch_body, MultipartOptions};
use async_graphql::{ParseRequestError, ServerError};
use axum::http::StatusCode;
use futures_util::io::Cursor;

use crate::config::UploadConfig;
use crate::graphql::{GraphQLOptions, HttpQueryError};
use crate::http::{PlatformRequest, RequestBody};

pub use placeholder::{FileMetadata, UploadPlaceholder, DEFAULT_ENCODING, DEFAULT_MIMETYPE};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Returns true for `multipart/form-data` content types (any parameters).
pub fn is_multipart(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..MULTIPART_FORM_DATA.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MULTIPART_FORM_DATA))
}

/// Replaces multipart bodies with parsed GraphQL operations.
#[derive(Debug, Clone, Default)]
pub struct UploadInterceptor {
    config: UploadConfig,
}

impl UploadInterceptor {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn multipart_options(&self) -> MultipartOptions {
        let mut options = MultipartOptions::default();
        if let Some(size) = self.config.max_file_size {
            options = options.max_file_size(size);
        }
        if let Some(count) = self.config.max_files {
            options = options.max_num_files(count);
        }
        options
    }

    /// Parse a multipart body in place; other requests pass through untouched.
    pub async fn intercept<E>(
        &self,
        request: &mut PlatformRequest,
        options: &GraphQLOptions<E>,
    ) -> Result<(), HttpQueryError> {
        if !self.config.enabled {
            return Ok(());
        }
        let Some(content_type) = request
            .content_type()
            .filter(|ct| is_multipart(ct))
            .map(str::to_string)
        else {
            return Ok(());
        };
        let bytes = match request.body.take() {
            Some(RequestBody::Raw(bytes)) => bytes,
            other => {
                request.body = other;
                return Ok(());
            }
        };

        tracing::debug!(size = bytes.len(), "Parsing multipart upload request");

        match receive_batch_body(Some(content_type.as_str()), Cursor::new(bytes), self.multipart_options()).await {
            Ok(batch) => {
                request.body = Some(RequestBody::Operations(batch));
                Ok(())
            }
            Err(e) => {
                let status = match e {
                    ParseRequestError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                tracing::warn!(error = %e, status = %status, "Multipart upload rejected");
                let error = options.format_error(ServerError::new(e.to_string(), None));
                Err(HttpQueryError::graphql(status, &[error]))
            }
        }
    }
}
