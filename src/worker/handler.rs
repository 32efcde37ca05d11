use lambda_runtime::{Error, LambdaEvent};
use serde::Deserialize;
use tracing::{error, info};

use super::archive::{self, ArchiveSettings};
use crate::core::models::ArchiveTask;
use crate::errors::ArchiveError;
use crate::slack::ChatApi;
use crate::storage::BlobStore;

/// Clients and settings built once per cold start and shared by every invocation.
pub struct WorkerContext<C, S> {
    pub chat: C,
    pub store: S,
    pub settings: ArchiveSettings,
}

#[derive(Debug, Deserialize)]
pub struct SqsEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<SqsRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SqsRecord {
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
    pub body: String,
}

/// Decodes one SQS message body into an `ArchiveTask`.
///
/// # Errors
///
/// Returns `ArchiveError::ParseError` if the body is not a valid task.
pub fn parse_task(body: &str) -> Result<ArchiveTask, ArchiveError> {
    serde_json::from_str(body)
        .map_err(|e| ArchiveError::ParseError(format!("SQS body is not an ArchiveTask: {e}")))
}

/// Lambda handler for the Worker entrypoint.
///
/// Every record is processed in order. Undecodable records and failed
/// workflows are logged and dropped so SQS never redelivers them.
///
/// # Errors
///
/// Never fails for a well-formed SQS event; the `Result` is what the Lambda
/// runtime expects.
pub async fn function_handler<C, S>(
    ctx: &WorkerContext<C, S>,
    event: LambdaEvent<SqsEvent>,
) -> Result<(), Error>
where
    C: ChatApi,
    S: BlobStore,
{
    info!(
        "Worker Lambda received {} SQS record(s)",
        event.payload.records.len()
    );

    for record in &event.payload.records {
        let task = match parse_task(&record.body) {
            Ok(task) => task,
            Err(e) => {
                error!(
                    message_id = record.message_id.as_deref().unwrap_or("unknown"),
                    error = %e,
                    "Dropping undecodable SQS record"
                );
                continue;
            }
        };

        info!(
            correlation_id = %task.correlation_id,
            channel_id = %task.event.channel_id,
            message_ts = %task.event.message_ts,
            "Processing archive task"
        );
        archive::handle(&task, &ctx.chat, &ctx.store, &ctx.settings).await;
    }

    Ok(())
}

pub use self::function_handler as handler;
