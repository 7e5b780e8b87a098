//! Markdown export of a session transcript.
//!
//! Export is one-way: nothing here is ever read back.

use crate::clock::format_clock_time_in;
use crate::message::Origin;
use crate::session::Session;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Render the transcript as markdown using the local time zone.
pub fn to_markdown(session: &Session, title: &str) -> String {
    to_markdown_in(session, title, &Local)
}

/// Render the transcript as markdown with timestamps in `tz`.
pub fn to_markdown_in<Tz: TimeZone>(session: &Session, title: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = format!("# {title}\n\n");
    out.push_str(&format!("- **Session**: {}\n", session.session_id()));
    out.push_str(&format!("- **Messages**: {}\n", session.messages().len()));

    for message in session.messages() {
        let who = match message.origin() {
            Origin::User => "You",
            Origin::Assistant => "Assistant",
        };
        let time = format_clock_time_in(message.created_at(), tz);
        out.push_str(&format!("\n### {who} ({time})\n\n"));
        for line in message.text().lines() {
            out.push_str("> ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// File name for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!(
        "chatdock-transcript-{}.md",
        now.with_timezone(&Local).format("%Y%m%d_%H%M%S")
    )
}

/// Write the transcript to `dir` and return the created path.
pub fn export(
    session: &Session,
    title: &str,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, TranscriptError> {
    std::fs::create_dir_all(dir).map_err(TranscriptError::Io)?;
    let path = dir.join(export_file_name(now));
    let mut file = std::fs::File::create(&path).map_err(TranscriptError::Io)?;
    file.write_all(to_markdown(session, title).as_bytes())
        .map_err(TranscriptError::Io)?;
    Ok(path)
}

/// Errors that can occur when exporting a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// I/O error writing the export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
