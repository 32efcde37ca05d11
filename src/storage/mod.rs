//! Durable blob storage for archive records and relayed files

pub mod s3;

use async_trait::async_trait;

use crate::errors::ArchiveError;

pub use s3::S3BlobStore;

/// Content type used for rendered records.
pub const RECORD_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `body` under `key`, replacing any existing object.
    async fn put_object(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), ArchiveError>;
}

/// `messages/<channel_id>/<ts>.txt`
#[must_use]
pub fn record_key(channel_id: &str, message_ts: &str) -> String {
    format!("messages/{channel_id}/{message_ts}.txt")
}

/// `files/<file_id>/<file_name>`; a `/` inside the name is replaced so the
/// name stays a single key segment.
#[must_use]
pub fn file_key(file_id: &str, file_name: &str) -> String {
    format!("files/{file_id}/{}", file_name.replace('/', "_"))
}

/// Content type guessed from the file name, `application/octet-stream` when unknown.
#[must_use]
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
