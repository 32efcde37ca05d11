//! Common helper functions for API handlers.
//!
//! Response builders and the fire-and-forget modal open shared by the
//! interactive handler.

use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::slack::SlackClient;

// ============================================================================
// Response Builders
// ============================================================================

/// Returns a 200 OK response with an empty JSON body; this is Slack's ack.
#[must_use]
pub fn ok_empty() -> Value {
    json!({ "statusCode": 200, "body": "" })
}

/// Returns a 200 OK response with the `url_verification` challenge echoed back.
#[must_use]
pub fn ok_challenge(challenge: &str) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "text/plain" },
        "body": challenge
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}

// ============================================================================
// Modal Operations
// ============================================================================

/// Opens a modal, waiting at most `timeout_ms` so the Slack ack stays fast.
///
/// If the timeout fires, the `views.open` call keeps running in the background.
pub async fn open_modal_with_timeout(
    slack: &Arc<SlackClient>,
    trigger_id: &str,
    view: &Value,
    timeout_ms: u64,
) {
    let slack = Arc::clone(slack);
    let trigger_id = trigger_id.to_string();
    let view = view.clone();

    let modal_handle = tokio::spawn(async move {
        if let Err(e) = slack.open_modal(&trigger_id, &view).await {
            error!("Failed to open modal: {}", e);
        }
    });

    if tokio::time::timeout(Duration::from_millis(timeout_ms), modal_handle)
        .await
        .is_err()
    {
        warn!("views.open still pending after {}ms, acking anyway", timeout_ms);
    }
}
