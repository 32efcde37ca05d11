use serde_json::{Value, json};

/// `callback_id` of the single-field modal opened by the global shortcut.
pub const INPUT_MODAL_CALLBACK_ID: &str = "modal-id";

/// Build the single text-input modal opened by the `run-aws-lambda-app` shortcut.
#[must_use]
pub fn build_input_modal() -> Value {
    json!({
        "type": "modal",
        "callback_id": INPUT_MODAL_CALLBACK_ID,
        "title": { "type": "plain_text", "text": "My App" },
        "submit": { "type": "plain_text", "text": "Submit" },
        "close": { "type": "plain_text", "text": "Cancel" },
        "blocks": [
            {
                "type": "input",
                "element": { "type": "plain_text_input" },
                "label": { "type": "plain_text", "text": "Text" }
            }
        ]
    })
}
