//! Capture writer: timestamped appends to daily and named notes.
//!
//! # Responsibility
//! - Resolve today's daily note lazily, keyed by the capture date.
//! - Render heading and content as one block and append it in a single
//!   engine call.
//!
//! # Invariants
//! - Exactly one `AppendEntry` call per `append`; no retries.
//! - The writer never opens note files itself.

use super::capture_service::CaptureError;
use crate::engine::{EngineRequest, NoteEngine};
use crate::model::note::{daily_key, render_entry, render_entry_heading, CaptureTarget, NoteId};
use crate::repo::note_resolver::NoteResolver;
use chrono::NaiveDateTime;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedEntry {
    pub path: PathBuf,
    /// Heading line of the new entry, e.g. `* 09:30`.
    pub heading: String,
    /// Set when the daily note was created by this append.
    pub created: Option<NoteId>,
}

/// Appends entries through the engine.
pub struct EntryWriter<'e, E: NoteEngine + ?Sized> {
    engine: &'e E,
    daily: NoteResolver<&'e E>,
}

impl<'e, E: NoteEngine + ?Sized> EntryWriter<'e, E> {
    pub fn new(engine: &'e E, daily_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            daily: NoteResolver::new(engine, daily_dir),
        }
    }

    /// Appends `content` as a new entry stamped with `at`.
    ///
    /// For `CaptureTarget::Daily` the note for `at`'s date is resolved (and
    /// created on first use) before the append.
    pub fn append(
        &self,
        target: &CaptureTarget,
        content: &str,
        at: NaiveDateTime,
    ) -> Result<AppendedEntry, CaptureError> {
        match target {
            CaptureTarget::Daily => {
                let key = daily_key(at.date());
                let resolved = self.daily.resolve_or_create(&key)?;
                let mut entry = self.append_to(&resolved.path, content, at)?;
                entry.created = resolved.created;
                Ok(entry)
            }
            CaptureTarget::Note(path) => self.append_to(path, content, at),
        }
    }

    fn append_to(
        &self,
        path: &Path,
        content: &str,
        at: NaiveDateTime,
    ) -> Result<AppendedEntry, CaptureError> {
        let started_at = Instant::now();
        let request = EngineRequest::AppendEntry {
            path: path.to_path_buf(),
            block: render_entry(at, content),
        };

        match self.engine.evaluate(&request) {
            Ok(_) => {
                info!(
                    "event=entry_append module=service status=ok path={} content_len={} duration_ms={}",
                    path.display(),
                    content.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(AppendedEntry {
                    path: path.to_path_buf(),
                    heading: render_entry_heading(at),
                    created: None,
                })
            }
            Err(source) => {
                error!(
                    "event=entry_append module=service status=error path={} duration_ms={} error_code=append_failed error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(CaptureError::from_append(path, source))
            }
        }
    }
}
