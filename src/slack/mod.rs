//! All Slack-specific functionality

pub mod chat_api;
pub mod client;
pub mod message_formatter;
pub mod modal_builder;

// Re-export main types for convenience
pub use chat_api::ChatApi;
pub use client::SlackClient;
