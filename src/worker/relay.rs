//! Copies source attachments into the blob store and the archive thread.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::core::models::{FileInfo, FileRef};
use crate::errors::ArchiveError;
use crate::slack::ChatApi;
use crate::storage::{BlobStore, content_type_for, file_key};

/// Where relayed files are re-uploaded.
#[derive(Debug, Clone, Copy)]
pub struct RelayTarget<'a> {
    pub channel_id: &'a str,
    pub thread_ts: &'a str,
}

#[derive(Debug, Default)]
pub struct RelayReport {
    pub relayed: Vec<String>,
    pub failed: Vec<(String, ArchiveError)>,
}

impl RelayReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.relayed.len() + self.failed.len()
    }

    /// `Ok` when every file made it, otherwise `ArchiveError::FileRelay`.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::FileRelay` if at least one file failed.
    pub fn into_result(self) -> Result<usize, ArchiveError> {
        if self.failed.is_empty() {
            Ok(self.relayed.len())
        } else {
            Err(ArchiveError::FileRelay {
                failed: self.failed.len(),
                total: self.total(),
            })
        }
    }
}

/// Drops repeated file ids, keeping the first occurrence and the original order.
#[must_use]
pub fn dedupe_files(files: Vec<FileRef>) -> Vec<FileRef> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|f| seen.insert(f.id.clone()))
        .collect()
}

/// Relays files one at a time, in order.
///
/// A failing file is logged and skipped; files already relayed stay relayed.
pub async fn relay_files(
    files: &[FileRef],
    chat: &dyn ChatApi,
    store: &dyn BlobStore,
    target: RelayTarget<'_>,
    correlation_id: &str,
) -> RelayReport {
    let mut report = RelayReport::default();

    for file in files {
        match relay_one(file, chat, store, target).await {
            Ok(info) => {
                info!(
                    correlation_id,
                    file_id = %info.id,
                    file_name = %info.name,
                    "File relayed"
                );
                report.relayed.push(info.id);
            }
            Err(e) => {
                warn!(correlation_id, file_id = %file.id, error = %e, "File relay failed");
                report.failed.push((file.id.clone(), e));
            }
        }
    }

    report
}

async fn relay_one(
    file: &FileRef,
    chat: &dyn ChatApi,
    store: &dyn BlobStore,
    target: RelayTarget<'_>,
) -> Result<FileInfo, ArchiveError> {
    let info = chat.file_info(&file.id).await?;
    let content = chat.download_file(&info.url_private).await?;

    store
        .put_object(
            &file_key(&info.id, &info.name),
            &content,
            &content_type_for(&info.name),
        )
        .await?;

    chat.upload_file(
        target.channel_id,
        &info.name,
        &content,
        Some(target.thread_ts),
    )
    .await?;

    Ok(info)
}
