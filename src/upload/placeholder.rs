use std::fs::File;
use std::io::Read;

use async_graphql::{Context, SimpleObject, Upload, UploadValue};

/// Transfer encoding reported for every upload; part headers do not change it.
pub const DEFAULT_ENCODING: &str = "7bit";

/// MIME type reported when the part does not declare one.
pub const DEFAULT_MIMETYPE: &str = "application/octet-stream";

/// GraphQL-facing description of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "File")]
pub struct FileMetadata {
    pub filename: String,
    pub mimetype: String,
    pub encoding: String,
}

/// A file received in a multipart request, handed to resolvers.
#[derive(Debug)]
pub struct UploadPlaceholder {
    pub filename: String,
    pub mimetype: String,
    pub encoding: String,
    content: File,
}

impl UploadPlaceholder {
    /// Resolve an `Upload` argument inside a resolver.
    pub fn resolve(ctx: &Context<'_>, upload: &Upload) -> std::io::Result<Self> {
        upload.value(ctx).map(Self::from_value)
    }

    pub fn from_value(value: UploadValue) -> Self {
        Self {
            filename: value.filename,
            mimetype: value
                .content_type
                .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string()),
            encoding: DEFAULT_ENCODING.to_string(),
            content: value.content,
        }
    }

    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            filename: self.filename.clone(),
            mimetype: self.mimetype.clone(),
            encoding: self.encoding.clone(),
        }
    }

    /// Blocking reader over the file contents.
    pub fn into_read(self) -> impl Read {
        self.content
    }

    /// Async reader over the file contents.
    pub fn create_read_stream(self) -> tokio::fs::File {
        tokio::fs::File::from_std(self.content)
    }
}
