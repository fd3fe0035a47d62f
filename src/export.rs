//! Plain-text transcript export.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use agent_contract::Message;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// File name prefix of exported transcripts.
pub const EXPORT_FILE_PREFIX: &str = "weather-agent-chat";

/// Renders every message as `[timestamp] [User|Agent] content`, one per paragraph.
///
/// Timestamps are shown in `offset` local time.
pub fn export_transcript(messages: &[Message], offset: UtcOffset) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "[{}] [{}] {}",
                format_local_timestamp(message.timestamp, offset),
                message.role.label(),
                message.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// `2/14/2026, 9:05:00 AM` style timestamp in `offset` local time.
pub fn format_local_timestamp(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    let local = timestamp.to_offset(offset);
    local
        .format(format_description!(
            "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
        ))
        .unwrap_or_else(|_| local.to_string())
}

/// `weather-agent-chat-YYYY-MM-DD.txt` for the given calendar date.
pub fn export_file_name(date: Date) -> String {
    let day = date
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string());
    format!("{EXPORT_FILE_PREFIX}-{day}.txt")
}

/// The process's local UTC offset, or UTC when it cannot be determined.
pub fn current_local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Writes the transcript into `dir`, named after today's UTC date.
///
/// Returns the path written. An existing export for the same day is replaced.
pub fn write_export(dir: &Path, messages: &[Message], offset: UtcOffset) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(OffsetDateTime::now_utc().date()));
    fs::write(&path, export_transcript(messages, offset))?;
    Ok(path)
}
