//! The archive workflow run by the worker for each `message_save` shortcut.

use chrono_tz::Tz;
use tracing::{error, info};

use super::relay::{RelayTarget, dedupe_files, relay_files};
use crate::core::config::AppConfig;
use crate::core::models::{ArchiveRecord, ArchiveTask};
use crate::errors::ArchiveError;
use crate::slack::ChatApi;
use crate::slack::message_formatter::{
    RecordHeader, append_thread_section, render_record, render_thread_transcript,
};
use crate::storage::{BlobStore, RECORD_CONTENT_TYPE, record_key};

/// Reaction added to the source message once everything is archived.
pub const COMPLETION_REACTION: &str = "white_check_mark";

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    pub archive_channel_id: String,
    pub timezone: Tz,
}

impl ArchiveSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            archive_channel_id: config.archive_channel_id.clone(),
            timezone: config.timezone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The shortcut was used inside the archive channel itself.
    SkippedArchiveChannel,
    Archived {
        record_key: String,
        archive_ts: String,
        files_relayed: usize,
    },
}

/// Runs the workflow and swallows any failure after logging it.
///
/// This is the single error boundary: nothing is retried, nothing already
/// written is undone, and nothing is reported back to Slack.
pub async fn handle(
    task: &ArchiveTask,
    chat: &dyn ChatApi,
    store: &dyn BlobStore,
    settings: &ArchiveSettings,
) {
    match run(task, chat, store, settings).await {
        Ok(ArchiveOutcome::SkippedArchiveChannel) => {
            info!(
                correlation_id = %task.correlation_id,
                channel_id = %task.event.channel_id,
                "Shortcut invoked in the archive channel, nothing to do"
            );
        }
        Ok(ArchiveOutcome::Archived {
            record_key,
            archive_ts,
            files_relayed,
        }) => {
            info!(
                correlation_id = %task.correlation_id,
                record_key = %record_key,
                archive_ts = %archive_ts,
                files_relayed,
                "Message archived"
            );
        }
        Err(e) => {
            error!(
                correlation_id = %task.correlation_id,
                channel_id = %task.event.channel_id,
                message_ts = %task.event.message_ts,
                error = %e,
                "Archive workflow failed"
            );
        }
    }
}

/// Archives one message: record to storage, repost, relay files, react.
///
/// # Errors
///
/// Returns the first error raised by a Slack or storage call, or
/// `ArchiveError::FileRelay` if some attachments could not be relayed (in
/// which case the completion reaction is not added).
pub async fn run(
    task: &ArchiveTask,
    chat: &dyn ChatApi,
    store: &dyn BlobStore,
    settings: &ArchiveSettings,
) -> Result<ArchiveOutcome, ArchiveError> {
    let event = &task.event;
    let correlation_id = task.correlation_id.as_str();

    let invoker_name = chat.user_name(&event.user_id).await?;

    if event.channel_id == settings.archive_channel_id {
        return Ok(ArchiveOutcome::SkippedArchiveChannel);
    }

    let message = chat.message_at(&event.channel_id, &event.message_ts).await?;
    info!(correlation_id, message_ts = %message.ts, "Fetched source message");

    let author_name = chat.user_name(&message.user).await?;
    let mut files = message.files.clone();

    let header = RecordHeader {
        invoker_id: &event.user_id,
        invoker_name: &invoker_name,
        author_id: &message.user,
        author_name: &author_name,
        channel_id: &event.channel_id,
        message_ts: &message.ts,
        text: &message.text,
    };
    let mut text = render_record(&header, settings.timezone)?;

    if let Some(thread_ts) = event.thread_ts.as_deref() {
        let thread = chat.thread(&event.channel_id, thread_ts).await?;
        let replies = thread.replies();
        info!(correlation_id, thread_ts, replies = replies.len(), "Fetched thread");

        // Root included; dedupe drops the target's own files if it is the root.
        files.extend(thread.messages.iter().flat_map(|m| m.files.iter().cloned()));
        let transcript = render_thread_transcript(replies, settings.timezone)?;
        append_thread_section(&mut text, &transcript);
    }

    let record = ArchiveRecord {
        channel_id: event.channel_id.clone(),
        message_ts: event.message_ts.clone(),
        text,
    };

    let key = record_key(&record.channel_id, &record.message_ts);
    store
        .put_object(&key, record.text.as_bytes(), RECORD_CONTENT_TYPE)
        .await?;
    info!(correlation_id, record_key = %key, "Stored archive record");

    let archive_ts = chat
        .post_message(&settings.archive_channel_id, &record.text)
        .await?;
    info!(correlation_id, archive_ts = %archive_ts, "Posted record to archive channel");

    let files = dedupe_files(files);
    let files_relayed = relay_files(
        &files,
        chat,
        store,
        RelayTarget {
            channel_id: &settings.archive_channel_id,
            thread_ts: &archive_ts,
        },
        correlation_id,
    )
    .await
    .into_result()?;

    chat.add_reaction(&event.channel_id, COMPLETION_REACTION, &event.message_ts)
        .await?;

    Ok(ArchiveOutcome::Archived {
        record_key: key,
        archive_ts,
        files_relayed,
    })
}
