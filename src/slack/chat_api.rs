//! The Slack surface the archive workflow depends on.
//!
//! The workflow only ever talks to Slack through this trait, so the production
//! `SlackClient` and in-memory test doubles are interchangeable.

use async_trait::async_trait;

use crate::core::models::{FileInfo, Message, ThreadContext};
use crate::errors::ArchiveError;

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Display name for a user id (`users.info`).
    async fn user_name(&self, user_id: &str) -> Result<String, ArchiveError>;

    /// The single message at or before `ts`, inclusive (`conversations.history`, limit 1).
    async fn message_at(&self, channel_id: &str, ts: &str) -> Result<Message, ArchiveError>;

    /// Thread root and all replies (`conversations.replies`, inclusive).
    async fn thread(&self, channel_id: &str, thread_ts: &str)
    -> Result<ThreadContext, ArchiveError>;

    /// Posts plain text and returns the new message's ts.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String, ArchiveError>;

    async fn file_info(&self, file_id: &str) -> Result<FileInfo, ArchiveError>;

    /// Downloads a private file URL with the bot token as bearer auth.
    async fn download_file(&self, url: &str) -> Result<Vec<u8>, ArchiveError>;

    async fn upload_file(
        &self,
        channel_id: &str,
        filename: &str,
        content: &[u8],
        thread_ts: Option<&str>,
    ) -> Result<(), ArchiveError>;

    async fn add_reaction(&self, channel_id: &str, name: &str, ts: &str)
    -> Result<(), ArchiveError>;
}
