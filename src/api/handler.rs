//! API Lambda handler - thin router that delegates to specialized handlers.
//!
//! This module handles:
//! - Request validation (headers, body, signature)
//! - `url_verification` challenges
//! - Interactive components (delegated to `interactive_handler` module)

use aws_sdk_sqs::Client as SqsClient;
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use super::{helpers, interactive_handler, parsing, signature};
use crate::core::config::AppConfig;
use crate::slack::SlackClient;

/// Clients and configuration built once per cold start.
pub struct ApiContext {
    pub config: AppConfig,
    pub slack: Arc<SlackClient>,
    pub sqs: SqsClient,
}

impl ApiContext {
    pub async fn from_config(config: AppConfig) -> Self {
        let shared_config = aws_config::from_env().load().await;
        let slack = Arc::new(SlackClient::new(config.slack_bot_token.clone()));
        Self {
            config,
            slack,
            sqs: SqsClient::new(&shared_config),
        }
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never returns `Err`; malformed or unsigned requests get a 4xx payload.
#[tracing::instrument(level = "info", skip_all)]
pub async fn function_handler(
    ctx: &ApiContext,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(route_request(ctx, &event.payload).await)
}

/// Validates, verifies and dispatches one API Gateway request payload.
pub async fn route_request(ctx: &ApiContext, payload: &Value) -> Value {
    // ========================================================================
    // Extract and validate headers and body
    // ========================================================================

    let Some(headers) = payload.get("headers") else {
        error!("Request missing headers");
        return helpers::err_response(400, "Missing headers");
    };

    let body = match parsing::extract_body(payload) {
        Ok(b) => b,
        Err(e) => {
            error!("Invalid request body: {}", e);
            return helpers::err_response(400, &e.to_string());
        }
    };

    // ========================================================================
    // Verify Slack signature
    // ========================================================================

    if let Err(response) = verify_signature(&body, headers, &ctx.config) {
        return response;
    }

    info!("Slack signature verified successfully");

    // ========================================================================
    // Route to specialized handlers
    // ========================================================================

    if let Ok(json_body) = serde_json::from_str::<Value>(&body)
        && json_body.get("type").and_then(Value::as_str) == Some("url_verification")
    {
        let challenge = json_body
            .get("challenge")
            .and_then(Value::as_str)
            .unwrap_or("");
        return helpers::ok_challenge(challenge);
    }

    if parsing::is_interactive_body(&body) {
        return match parsing::parse_interactive_payload(&body) {
            Ok(interactive) => interactive_handler::handle_interactive(ctx, &interactive).await,
            Err(e) => {
                error!("Interactive payload parse error: {}", e);
                helpers::err_response(400, &e.to_string())
            }
        };
    }

    info!("Ignoring unsupported request body");
    helpers::err_response(400, "Unsupported request")
}

fn verify_signature(body: &str, headers: &Value, config: &AppConfig) -> Result<(), Value> {
    let Some(sig) = parsing::get_header_value(headers, "X-Slack-Signature") else {
        error!("Missing X-Slack-Signature header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = parsing::get_header_value(headers, "X-Slack-Request-Timestamp") else {
        error!("Missing X-Slack-Request-Timestamp header");
        return Err(helpers::err_response(
            401,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, &config.slack_signing_secret) {
        error!("Slack signature verification failed");
        return Err(helpers::err_response(401, "Invalid Slack signature"));
    }

    Ok(())
}

pub use self::function_handler as handler;
