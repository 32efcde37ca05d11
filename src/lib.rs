//! Slack message archiver - saves a message, its thread and its files on demand.
//!
//! A user runs the `message_save` message shortcut; the bot renders the message
//! (and thread) into a text record, stores it and every attachment in S3,
//! reposts it to the archive channel with the files threaded underneath, and
//! reacts with a checkmark on the original message.
//!
//! # Architecture
//!
//! The system uses:
//! - An API Lambda that verifies Slack requests, acks within 3 seconds and queues work
//! - SQS to hand the work to a Worker Lambda
//! - A Worker Lambda that runs the archive workflow against Slack and S3
//! - slack-morphism and reqwest for Slack API interactions
//! - aws-sdk-s3 for the blob store
//!
//! # Example
//!
//! ```no_run
//! use archiver::core::config::AppConfig;
//! use archiver::core::models::{ArchiveTask, ShortcutEvent};
//! use archiver::slack::SlackClient;
//! use archiver::storage::S3BlobStore;
//! use archiver::worker::archive::{self, ArchiveSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     archiver::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let chat = SlackClient::new(config.slack_bot_token.clone());
//!     let store = S3BlobStore::from_env(config.archive_bucket.clone()).await;
//!
//!     let task = ArchiveTask {
//!         correlation_id: "demo".into(),
//!         event: ShortcutEvent {
//!             user_id: "U123".into(),
//!             channel_id: "C12345678".into(),
//!             message_ts: "1700000000.000100".into(),
//!             thread_ts: None,
//!         },
//!     };
//!     archive::handle(&task, &chat, &store, &ArchiveSettings::from_config(&config)).await;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod core;
pub mod errors;
pub mod slack;
pub mod storage;
pub mod worker;

pub use errors::ArchiveError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Sets up tracing-subscriber with a JSON formatter suitable for `CloudWatch`
/// Logs. The level comes from `RUST_LOG` and defaults to `info`. Calling it
/// more than once is harmless.
///
/// # Example
///
/// ```
/// archiver::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
