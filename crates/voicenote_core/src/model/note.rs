//! Note, entry and capture-request model.
//!
//! # Responsibility
//! - Define `CaptureRequest` and its validation rules.
//! - Render the persisted text layout (front matter and entry blocks).
//!
//! # Invariants
//! - `NoteId` is generated once per note and never reused.
//! - Entry headings use minute resolution (`* HH:MM`).
//! - An entry block always ends with exactly one trailing newline added by
//!   this module when the content lacks one.
//! - Content never adds headings: lines that Org would read as a heading get
//!   a leading `,`.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use uuid::Uuid;

/// Stable identifier written into a note's property drawer.
pub type NoteId = Uuid;

/// Which kind of note a capture is filed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Today's dated journal note.
    Daily,
    /// A named topical note, created on first use.
    Named,
}

impl CaptureKind {
    /// Mode token passed to the recording helper and used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Named => "note",
        }
    }
}

impl Display for CaptureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected capture request shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Named capture without a usable note name.
    MissingNoteName,
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNoteName => write!(f, "a note name is required for named captures"),
        }
    }
}

impl Error for RequestError {}

/// One unit of capture work. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub kind: CaptureKind,
    /// Note identifier; only meaningful for `CaptureKind::Named`.
    pub target: Option<String>,
    /// Verbatim transcribed text. May be empty.
    pub content: String,
}

impl CaptureRequest {
    /// Creates a capture for today's daily note.
    pub fn daily(content: impl Into<String>) -> Self {
        Self {
            kind: CaptureKind::Daily,
            target: None,
            content: content.into(),
        }
    }

    /// Creates a capture for a named note.
    pub fn named(target: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: CaptureKind::Named,
            target: Some(target.into()),
            content: content.into(),
        }
    }

    /// Checks the request shape before any side effect happens.
    ///
    /// Daily requests ignore `target`. Named requests need a non-blank name.
    pub fn validate(&self) -> Result<(), RequestError> {
        match self.kind {
            CaptureKind::Daily => Ok(()),
            CaptureKind::Named => match self.target.as_deref() {
                Some(name) if !name.trim().is_empty() => Ok(()),
                _ => Err(RequestError::MissingNoteName),
            },
        }
    }
}

/// Where the capture writer appends an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Today's daily note, resolved lazily by the writer.
    Daily,
    /// A note file already resolved by the note resolver.
    Note(PathBuf),
}

/// Directories holding named and daily notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLayout {
    pub notes_dir: PathBuf,
    pub daily_dir: PathBuf,
}

/// Identifier (and title) of the daily note for `date`, e.g. `2024-06-01`.
pub fn daily_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders the property drawer and title header of a new note.
///
/// Line breaks in `title` are folded to spaces so the header stays a single
/// `#+title:` line.
pub fn render_front_matter(id: NoteId, title: &str) -> String {
    let title = title.replace(['\r', '\n'], " ");
    format!(
        ":PROPERTIES:\n:ID:       {id}\n:END:\n#+title: {}\n\n",
        title.trim()
    )
}

/// Renders the minute-resolution entry heading, e.g. `* 09:05`.
pub fn render_entry_heading(at: NaiveDateTime) -> String {
    format!("* {}", at.format("%H:%M"))
}

// Already-escaped lines match too, so escaping stays reversible.
static HEADING_LIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(,*\*+(?:[ \t]|$))").expect("valid heading regex"));

/// Renders one entry block: heading line, content, trailing newline.
///
/// Content is kept verbatim except for heading-like lines, which are escaped
/// with a leading `,` the way Org escapes them inside blocks.
pub fn render_entry(at: NaiveDateTime, content: &str) -> String {
    let mut block = render_entry_heading(at);
    block.push('\n');
    block.push_str(&HEADING_LIKE_RE.replace_all(content, ",${1}"));
    if !block.ends_with('\n') {
        block.push('\n');
    }
    block
}
