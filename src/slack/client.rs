//! Slack API client module
//!
//! Wraps the Slack Web API calls the archiver makes. Methods modelled by
//! slack-morphism go through a hyper session; the rest (`files.info`,
//! `views.open`, private file download) use `reqwest` with typed responses.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiConversationsHistoryRequest,
    SlackApiConversationsRepliesRequest, SlackApiFilesComplete,
    SlackApiFilesCompleteUploadExternalRequest, SlackApiFilesGetUploadUrlExternalRequest,
    SlackApiReactionsAddRequest, SlackApiUsersInfoRequest,
};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackHistoryMessage, SlackMessageContent,
    SlackReactionName, SlackTs, SlackUserId,
};
use std::time::Duration;
use tracing::{debug, warn};

use super::chat_api::ChatApi;
use crate::core::models::{FileInfo, FileRef, Message, ThreadContext};
use crate::errors::ArchiveError;

const FILES_INFO_URL: &str = "https://slack.com/api/files.info";
const VIEWS_OPEN_URL: &str = "https://slack.com/api/views.open";

/// Upper bound for one `conversations.replies` page.
const THREAD_REPLY_LIMIT: u16 = 1000;

// Build the Slack client connector safely without panicking.
// If connector construction fails, store None and surface an ArchiveError at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
});

fn hyper_client() -> Result<&'static SlackHyperClient, ArchiveError> {
    SLACK_CLIENT.as_ref().ok_or_else(|| {
        ArchiveError::GeneralError("Slack HTTP connector not initialized".to_string())
    })
}

#[derive(Debug, Deserialize)]
struct FilesInfoResponse {
    ok: bool,
    file: Option<FileInfo>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OkResponse {
    ok: bool,
    error: Option<String>,
}

/// Converts a slack-morphism history message into the archive's typed `Message`.
///
/// # Errors
///
/// Returns `ArchiveError::ParseError` when the message has no user author.
pub fn to_message(msg: SlackHistoryMessage) -> Result<Message, ArchiveError> {
    let ts = msg.origin.ts.0;
    let user = msg
        .sender
        .user
        .map(|u| u.0)
        .ok_or_else(|| ArchiveError::ParseError(format!("message {ts} has no user")))?;
    let text = msg.content.text.unwrap_or_default();
    let files = msg
        .content
        .files
        .unwrap_or_default()
        .into_iter()
        .map(|f| FileRef {
            id: f.id.0,
            name: f.name,
            url_private: f.url_private.map(|u| u.to_string()),
        })
        .collect();

    Ok(Message {
        user,
        ts,
        text,
        files,
    })
}

/// Maps a Slack `{ok, error}` envelope to a result.
fn check_ok(method: &str, ok: bool, error: Option<&str>) -> Result<(), ArchiveError> {
    if ok {
        Ok(())
    } else {
        Err(ArchiveError::ApiError(format!(
            "{method} error: {}",
            error.unwrap_or("unknown")
        )))
    }
}

/// Slack API client authenticated with the bot token
pub struct SlackClient {
    token: SlackApiToken,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        }
    }

    /// Opens a Block Kit modal via `views.open`.
    ///
    /// # Errors
    ///
    /// Returns an error if the Slack API request or response parsing fails.
    pub async fn open_modal(&self, trigger_id: &str, view: &Value) -> Result<(), ArchiveError> {
        let payload = json!({
            "trigger_id": trigger_id,
            "view": view
        });

        let resp = HTTP_CLIENT
            .post(VIEWS_OPEN_URL)
            .bearer_auth(&self.token.token_value.0)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ArchiveError::HttpError(format!("Failed to open modal: {e}")))?;

        if !resp.status().is_success() {
            return Err(ArchiveError::ApiError(format!(
                "views.open HTTP {}",
                resp.status()
            )));
        }

        let body: OkResponse = resp.json().await?;
        check_ok("views.open", body.ok, body.error.as_deref())
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn user_name(&self, user_id: &str) -> Result<String, ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);
        let req = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));
        let info = session.users_info(&req).await?;

        let name = info
            .user
            .profile
            .as_ref()
            .and_then(|p| p.real_name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| {
                info.user
                    .profile
                    .as_ref()
                    .and_then(|p| p.display_name.clone())
                    .filter(|n| !n.is_empty())
            })
            .unwrap_or_else(|| user_id.to_string());

        Ok(name)
    }

    async fn message_at(&self, channel_id: &str, ts: &str) -> Result<Message, ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);
        let request = SlackApiConversationsHistoryRequest::new()
            .with_channel(SlackChannelId(channel_id.to_string()))
            .with_latest(SlackTs(ts.to_string()))
            .with_inclusive(true)
            .with_limit(1);

        let result = session.conversations_history(&request).await?;

        let msg = result.messages.into_iter().next().ok_or_else(|| {
            ArchiveError::NotFound(format!("no message at {ts} in channel {channel_id}"))
        })?;
        to_message(msg)
    }

    async fn thread(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<ThreadContext, ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);
        let request = SlackApiConversationsRepliesRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackTs(thread_ts.to_string()),
        )
        .with_inclusive(true)
        .with_limit(THREAD_REPLY_LIMIT);

        let result = session.conversations_replies(&request).await?;
        debug!(
            "conversations.replies returned {} messages for thread {}",
            result.messages.len(),
            thread_ts
        );

        let messages = result
            .messages
            .into_iter()
            .map(to_message)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ThreadContext { messages })
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String, ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);
        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        let resp = session.chat_post_message(&post_req).await?;
        Ok(resp.ts.0)
    }

    async fn file_info(&self, file_id: &str) -> Result<FileInfo, ArchiveError> {
        let resp = HTTP_CLIENT
            .get(FILES_INFO_URL)
            .bearer_auth(&self.token.token_value.0)
            .query(&[("file", file_id)])
            .send()
            .await
            .map_err(|e| ArchiveError::HttpError(format!("files.info request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ArchiveError::ApiError(format!(
                "files.info HTTP {}",
                resp.status()
            )));
        }

        let body: FilesInfoResponse = resp.json().await.map_err(|e| {
            ArchiveError::ParseError(format!("files.info response for {file_id}: {e}"))
        })?;
        check_ok("files.info", body.ok, body.error.as_deref())?;

        body.file
            .ok_or_else(|| ArchiveError::ParseError(format!("files.info: no file for {file_id}")))
    }

    async fn download_file(&self, url: &str) -> Result<Vec<u8>, ArchiveError> {
        let resp = HTTP_CLIENT
            .get(url)
            .bearer_auth(&self.token.token_value.0)
            .send()
            .await
            .map_err(|e| ArchiveError::HttpError(format!("Failed to download Slack file: {e}")))?;

        if !resp.status().is_success() {
            return Err(ArchiveError::ApiError(format!(
                "Slack file download HTTP {}",
                resp.status()
            )));
        }

        let bytes = resp.bytes().await.map_err(|e| {
            ArchiveError::HttpError(format!("Error reading Slack file download: {e}"))
        })?;
        Ok(bytes.to_vec())
    }

    async fn upload_file(
        &self,
        channel_id: &str,
        filename: &str,
        content: &[u8],
        thread_ts: Option<&str>,
    ) -> Result<(), ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);

        // Step 1: reserve an upload URL.
        let url_request =
            SlackApiFilesGetUploadUrlExternalRequest::new(filename.to_string(), content.len());
        let url_response = session.get_upload_url_external(&url_request).await?;

        // Step 2: send the bytes.
        let resp = HTTP_CLIENT
            .post(url_response.upload_url.0.to_string())
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| ArchiveError::HttpError(format!("Failed to upload file: {e}")))?;
        if !resp.status().is_success() {
            return Err(ArchiveError::ApiError(format!(
                "file upload HTTP {}",
                resp.status()
            )));
        }

        // Step 3: share it into the channel/thread.
        let file_ref = SlackApiFilesComplete {
            id: url_response.file_id,
            title: Some(filename.to_string()),
        };
        let mut complete_request = SlackApiFilesCompleteUploadExternalRequest::new(vec![file_ref]);
        complete_request.channel_id = Some(SlackChannelId(channel_id.to_string()));
        complete_request.thread_ts = thread_ts.map(|ts| SlackTs(ts.to_string()));
        session
            .files_complete_upload_external(&complete_request)
            .await?;

        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        name: &str,
        ts: &str,
    ) -> Result<(), ArchiveError> {
        let session = hyper_client()?.open_session(&self.token);
        let req = SlackApiReactionsAddRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackReactionName(name.to_string()),
            SlackTs(ts.to_string()),
        );
        session.reactions_add(&req).await?;
        Ok(())
    }
}
