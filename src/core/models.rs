use serde::{Deserialize, Serialize};

/// A `message_save` shortcut invocation, reduced to what the archive needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutEvent {
    pub user_id: String,
    pub channel_id: String,
    pub message_ts: String,
    pub thread_ts: Option<String>,
}

/// Unit of work handed from the API Lambda to the worker through SQS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveTask {
    pub correlation_id: String,
    pub event: ShortcutEvent,
}

/// File attachment as it appears on a fetched message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: String,
    pub name: Option<String>,
    pub url_private: Option<String>,
}

/// Fully resolved `files.info` metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    pub url_private: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub user: String,
    pub ts: String,
    pub text: String,
    pub files: Vec<FileRef>,
}

/// Root message followed by its replies, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadContext {
    pub messages: Vec<Message>,
}

impl ThreadContext {
    #[must_use]
    pub fn replies(&self) -> &[Message] {
        self.messages.get(1..).unwrap_or_default()
    }
}

/// Rendered archive document, keyed by source channel and message ts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub channel_id: String,
    pub message_ts: String,
    pub text: String,
}
