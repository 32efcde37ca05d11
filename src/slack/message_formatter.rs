//! Rendering of archive records.
//!
//! Everything here is pure: the same inputs always produce the same text, and
//! the Slack timestamp used for links and storage keys is never modified.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::core::models::Message;
use crate::errors::ArchiveError;

const ARCHIVE_LINK_BASE: &str = "https://slack.com/archives";
const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Attribution and body fields for the head of a record.
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader<'a> {
    pub invoker_id: &'a str,
    pub invoker_name: &'a str,
    pub author_id: &'a str,
    pub author_name: &'a str,
    pub channel_id: &'a str,
    pub message_ts: &'a str,
    pub text: &'a str,
}

/// Formats the whole-second part of a Slack ts as `YYYY/MM/DD HH:MM:SS` in `tz`.
///
/// # Errors
///
/// Returns `ArchiveError::ParseError` if the ts does not start with an integer
/// number of seconds or is outside chrono's representable range.
///
/// # Examples
///
/// ```
/// use archiver::slack::message_formatter::format_timestamp;
///
/// let formatted = format_timestamp("1700000000.000100", chrono_tz::Tz::UTC).unwrap();
/// assert_eq!(formatted, "2023/11/14 22:13:20");
/// ```
pub fn format_timestamp(ts: &str, tz: Tz) -> Result<String, ArchiveError> {
    let seconds = ts.split_once('.').map_or(ts, |(secs, _)| secs);
    let seconds: i64 = seconds
        .parse()
        .map_err(|e| ArchiveError::ParseError(format!("invalid Slack timestamp '{ts}': {e}")))?;

    let utc = DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
        ArchiveError::ParseError(format!("Slack timestamp '{ts}' is out of range"))
    })?;

    Ok(utc.with_timezone(&tz).format(DATE_FORMAT).to_string())
}

/// Deep link to a message: `https://slack.com/archives/<channel>/p<ts without dots>`.
#[must_use]
pub fn message_link(channel_id: &str, ts: &str) -> String {
    format!("{ARCHIVE_LINK_BASE}/{channel_id}/p{}", ts.replace('.', ""))
}

/// Renders the base record: who saved it, who wrote it, when, where, and what.
///
/// # Errors
///
/// Returns an error if the message ts cannot be formatted.
pub fn render_record(header: &RecordHeader<'_>, tz: Tz) -> Result<String, ArchiveError> {
    let date = format_timestamp(header.message_ts, tz)?;
    let link = message_link(header.channel_id, header.message_ts);

    let mut out = format!(
        "このメッセージ保存を実行したユーザー: {} (<@{}>)",
        header.invoker_name, header.invoker_id
    );
    let _ = write!(
        out,
        "\n\n投稿者: {} (<@{}>)\n日時: {date}\nリンク: {link}\nメッセージ:\n{}\n\n",
        header.author_name, header.author_id, header.text
    );
    Ok(out)
}

/// Renders thread replies, 1-based, one entry per reply in the given order.
///
/// Callers pass the replies only; the thread root is not part of the transcript.
///
/// # Errors
///
/// Returns an error if any reply ts cannot be formatted.
pub fn render_thread_transcript(replies: &[Message], tz: Tz) -> Result<String, ArchiveError> {
    let entries = replies
        .iter()
        .enumerate()
        .map(|(idx, reply)| {
            let date = format_timestamp(&reply.ts, tz)?;
            Ok(format!(
                "投稿者:<@{}>\n日時: {date}\nメッセージ {}: {}",
                reply.user,
                idx + 1,
                reply.text
            ))
        })
        .collect::<Result<Vec<String>, ArchiveError>>()?;

    Ok(entries.join("\n"))
}

/// Appends the thread section to a rendered base record.
pub fn append_thread_section(record: &mut String, transcript: &str) {
    let _ = write!(record, "スレッド:\n{transcript}");
}
