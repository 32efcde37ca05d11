use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;

use crate::core::models::ShortcutEvent;
use crate::errors::ArchiveError;

#[derive(Debug, Clone, Deserialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcutMessage {
    pub ts: String,
    pub thread_ts: Option<String>,
}

/// `message_action` payload: a shortcut attached to a specific message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageActionPayload {
    pub callback_id: String,
    pub user: IdRef,
    pub channel: IdRef,
    pub message: ShortcutMessage,
}

impl MessageActionPayload {
    #[must_use]
    pub fn to_event(&self) -> ShortcutEvent {
        ShortcutEvent {
            user_id: self.user.id.clone(),
            channel_id: self.channel.id.clone(),
            message_ts: self.message.ts.clone(),
            thread_ts: self.message.thread_ts.clone(),
        }
    }
}

/// `shortcut` payload: a global shortcut with no message context.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalShortcutPayload {
    pub callback_id: String,
    pub trigger_id: String,
    pub user: IdRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewSubmissionPayload {
    pub user: IdRef,
    pub view: Value,
}

/// Interactive payloads the archiver understands, keyed by Slack's `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractivePayload {
    MessageAction(MessageActionPayload),
    Shortcut(GlobalShortcutPayload),
    ViewSubmission(ViewSubmissionPayload),
    #[serde(other)]
    Other,
}

/// Decodes one `application/x-www-form-urlencoded` component.
///
/// # Errors
///
/// Returns an error if the decoded bytes are not valid UTF-8.
///
/// # Examples
///
/// ```
/// use archiver::api::parsing::decode_url_component;
///
/// assert_eq!(decode_url_component("hello+world%21").unwrap(), "hello world!");
/// assert_eq!(decode_url_component("a%2Bb").unwrap(), "a+b");
/// ```
pub fn decode_url_component(input: &str) -> Result<String, String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| format!("Failed to decode URL component: {e}"))
}

pub fn is_interactive_body(body: &str) -> bool {
    body.starts_with("payload=") || body.contains("&payload=")
}

/// Extracts and decodes the `payload=` field of an interactive request.
///
/// # Errors
///
/// Returns `ArchiveError::ParseError` if the field is missing, not valid
/// URL encoding, or not a payload shape the archiver knows.
pub fn parse_interactive_payload(form_body: &str) -> Result<InteractivePayload, ArchiveError> {
    for pair in form_body.split('&') {
        if let Some((key, raw_val)) = pair.split_once('=')
            && key == "payload"
        {
            let decoded = decode_url_component(raw_val).map_err(|e| {
                ArchiveError::ParseError(format!("Failed to decode payload: {e}"))
            })?;
            return serde_json::from_str(&decoded)
                .map_err(|e| ArchiveError::ParseError(format!("Invalid interactive payload: {e}")));
        }
    }
    Err(ArchiveError::ParseError("Missing payload field".to_string()))
}

/// Returns the request body as text, undoing API Gateway / Function URL base64 encoding.
///
/// # Errors
///
/// Returns `ArchiveError::ParseError` if the body is missing or cannot be decoded.
pub fn extract_body(payload: &Value) -> Result<String, ArchiveError> {
    let body = payload
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| ArchiveError::ParseError("Missing body".to_string()))?;

    let is_base64 = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !is_base64 {
        return Ok(body.to_string());
    }

    let bytes = BASE64
        .decode(body)
        .map_err(|e| ArchiveError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ArchiveError::ParseError(format!("Body is not UTF-8: {e}")))
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}
