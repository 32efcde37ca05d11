//! Handler for Slack interactive components.
//!
//! This module processes interactive payloads including:
//! - `message_action` - the `message_save` archive shortcut
//! - `shortcut` - the global shortcut that opens the input modal
//! - `view_submission` - submissions of that modal

use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::handler::ApiContext;
use super::helpers::{ok_empty, open_modal_with_timeout};
use super::parsing::{
    GlobalShortcutPayload, InteractivePayload, MessageActionPayload, ViewSubmissionPayload, v_str,
};
use super::sqs;
use crate::core::models::ArchiveTask;
use crate::slack::modal_builder::{INPUT_MODAL_CALLBACK_ID, build_input_modal};

/// Message shortcut that archives the target message.
pub const MESSAGE_SAVE_CALLBACK_ID: &str = "message_save";
/// Global shortcut that opens the input modal.
pub const INPUT_MODAL_SHORTCUT_ID: &str = "run-aws-lambda-app";

/// Slack allows 3s for the ack; leave headroom for the response itself.
const MODAL_OPEN_TIMEOUT_MS: u64 = 2000;

/// Wraps a `message_save` invocation into a queueable task with a fresh correlation id.
#[must_use]
pub fn build_archive_task(payload: &MessageActionPayload) -> ArchiveTask {
    ArchiveTask {
        correlation_id: Uuid::new_v4().to_string(),
        event: payload.to_event(),
    }
}

// ============================================================================
// Shortcut Handlers
// ============================================================================

async fn handle_message_action(ctx: &ApiContext, payload: &MessageActionPayload) -> Value {
    if payload.callback_id != MESSAGE_SAVE_CALLBACK_ID {
        info!("Unhandled message shortcut: {}", payload.callback_id);
        return ok_empty();
    }

    let task = build_archive_task(payload);
    info!(
        correlation_id = %task.correlation_id,
        user_id = %task.event.user_id,
        channel_id = %task.event.channel_id,
        message_ts = %task.event.message_ts,
        "Enqueueing archive task"
    );

    // The ack goes out regardless; a lost task is only logged.
    if let Err(e) = sqs::send_to_sqs(&ctx.sqs, &ctx.config.processing_queue_url, &task).await {
        error!(correlation_id = %task.correlation_id, error = %e, "Enqueue failed");
    }

    ok_empty()
}

async fn handle_global_shortcut(ctx: &ApiContext, payload: &GlobalShortcutPayload) -> Value {
    if payload.callback_id != INPUT_MODAL_SHORTCUT_ID {
        info!("Unhandled global shortcut: {}", payload.callback_id);
        return ok_empty();
    }

    info!(user_id = %payload.user.id, "Opening input modal");
    let view = build_input_modal();
    open_modal_with_timeout(&ctx.slack, &payload.trigger_id, &view, MODAL_OPEN_TIMEOUT_MS).await;

    ok_empty()
}

// ============================================================================
// View Submission Handlers
// ============================================================================

fn handle_view_submission(payload: &ViewSubmissionPayload) -> Value {
    let callback_id = v_str(&payload.view, &["callback_id"]).unwrap_or("");

    if callback_id == INPUT_MODAL_CALLBACK_ID {
        info!(
            user_id = %payload.user.id,
            view = %payload.view,
            "Input modal submitted"
        );
    } else {
        info!("Unhandled view submission: {}", callback_id);
    }

    ok_empty()
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Handle an interactive payload from Slack.
///
/// Always produces a 200 ack; any follow-up work happens elsewhere.
pub async fn handle_interactive(ctx: &ApiContext, payload: &InteractivePayload) -> Value {
    match payload {
        InteractivePayload::MessageAction(p) => handle_message_action(ctx, p).await,
        InteractivePayload::Shortcut(p) => handle_global_shortcut(ctx, p).await,
        InteractivePayload::ViewSubmission(p) => handle_view_submission(p),
        InteractivePayload::Other => {
            info!("Unhandled interactive type");
            ok_empty()
        }
    }
}
