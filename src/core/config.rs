use std::env;

use chrono_tz::Tz;

use crate::errors::ArchiveError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub processing_queue_url: String,
    pub slack_signing_secret: String,
    pub slack_bot_token: String,
    pub archive_channel_id: String,
    pub archive_bucket: String,
    pub timezone: Tz,
}

impl AppConfig {
    /// Reads the process environment once at cold start.
    ///
    /// `ARCHIVE_CHANNEL` falls back to the legacy `CHANNEL` variable and
    /// `ARCHIVE_TIMEZONE` defaults to UTC.
    ///
    /// Both binaries load the same config, so every required variable must be
    /// set for each Lambda even if that function never reads it: the worker
    /// needs `PROCESSING_QUEUE_URL` and `SLACK_SIGNING_SECRET`, the API needs
    /// `ARCHIVE_BUCKET`.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::ConfigError` naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, ArchiveError> {
        let archive_channel_id = env::var("ARCHIVE_CHANNEL")
            .or_else(|_| env::var("CHANNEL"))
            .map_err(|e| ArchiveError::ConfigError(format!("ARCHIVE_CHANNEL: {e}")))?;

        let timezone = match env::var("ARCHIVE_TIMEZONE") {
            Ok(raw) if !raw.trim().is_empty() => parse_timezone(&raw)?,
            _ => Tz::UTC,
        };

        Ok(Self {
            processing_queue_url: required("PROCESSING_QUEUE_URL")?,
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            archive_channel_id,
            archive_bucket: required("ARCHIVE_BUCKET")?,
            timezone,
        })
    }
}

fn required(name: &str) -> Result<String, ArchiveError> {
    env::var(name).map_err(|e| ArchiveError::ConfigError(format!("{name}: {e}")))
}

/// Parses an IANA zone name such as `Asia/Tokyo`.
///
/// # Errors
///
/// Returns `ArchiveError::ConfigError` when the name is not a known zone.
pub fn parse_timezone(raw: &str) -> Result<Tz, ArchiveError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|e| ArchiveError::ConfigError(format!("ARCHIVE_TIMEZONE: {e}")))
}
