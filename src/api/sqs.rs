use aws_sdk_sqs::Client as SqsClient;

use crate::core::models::ArchiveTask;
use crate::errors::ArchiveError;

/// Hands an archive task to the worker Lambda through the processing queue.
///
/// # Errors
///
/// Returns an error if serialization fails or the message cannot be sent to SQS.
pub async fn send_to_sqs(
    client: &SqsClient,
    queue_url: &str,
    task: &ArchiveTask,
) -> Result<(), ArchiveError> {
    let message_body = serde_json::to_string(task)
        .map_err(|e| ArchiveError::ParseError(format!("Failed to serialize task: {e}")))?;

    client
        .send_message()
        .queue_url(queue_url)
        .message_body(message_body)
        .send()
        .await
        .map_err(|e| ArchiveError::AwsError(format!("Failed to send message to SQS: {e}")))?;
    Ok(())
}
