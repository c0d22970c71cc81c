//! Capture orchestration service.
//!
//! # Responsibility
//! - Run one capture end to end: validate, ensure the daemon, resolve the
//!   target, append the entry.
//! - Own the `CaptureError` taxonomy surfaced to callers.
//!
//! # Invariants
//! - Steps run sequentially on the calling thread; nothing is retried.
//! - Named notes are resolved before any content is appended.
//! - Content text is never logged, only its length.

use super::entry_writer::EntryWriter;
use super::linking::link_entities;
use crate::clock::Clock;
use crate::daemon::{DaemonControl, DaemonSupervisor};
use crate::engine::{NoteEngine, RpcError};
use crate::model::note::{
    daily_key, CaptureKind, CaptureRequest, CaptureTarget, NoteLayout, RequestError,
};
use crate::repo::note_resolver::{NoteResolver, ResolveError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Terminal failure of one capture attempt.
#[derive(Debug)]
pub enum CaptureError {
    /// Malformed request, e.g. a named capture without a usable name.
    Usage(String),
    /// No engine answered; detected through a failed engine call.
    DaemonUnavailable { target: String, source: RpcError },
    /// A missing note could not be materialized.
    CreationFailed { identifier: String, source: RpcError },
    /// The entry could not be inserted into its note.
    AppendFailed { path: PathBuf, source: RpcError },
}

impl CaptureError {
    pub(crate) fn from_append(path: &Path, source: RpcError) -> Self {
        if source.is_unreachable() {
            return Self::DaemonUnavailable {
                target: path.display().to_string(),
                source,
            };
        }
        Self::AppendFailed {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage_error",
            Self::DaemonUnavailable { .. } => "daemon_unavailable",
            Self::CreationFailed { .. } => "creation_failed",
            Self::AppendFailed { .. } => "append_failed",
        }
    }
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "usage error: {message}"),
            Self::DaemonUnavailable { target, source } => {
                write!(f, "note engine unavailable while writing {target:?}: {source}")
            }
            Self::CreationFailed { identifier, source } => {
                write!(f, "could not create note {identifier:?}: {source}")
            }
            Self::AppendFailed { path, source } => {
                write!(f, "could not append entry to `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for CaptureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage(_) => None,
            Self::DaemonUnavailable { source, .. }
            | Self::CreationFailed { source, .. }
            | Self::AppendFailed { source, .. } => Some(source),
        }
    }
}

impl From<RequestError> for CaptureError {
    fn from(value: RequestError) -> Self {
        Self::Usage(value.to_string())
    }
}

impl From<ResolveError> for CaptureError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::InvalidIdentifier(identifier) => Self::Usage(format!(
                "note name {identifier:?} has no usable characters"
            )),
            ResolveError::CreationFailed { identifier, source } if source.is_unreachable() => {
                Self::DaemonUnavailable {
                    target: identifier,
                    source,
                }
            }
            ResolveError::CreationFailed { identifier, source } => {
                Self::CreationFailed { identifier, source }
            }
        }
    }
}

/// Success summary of one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReceipt {
    pub kind: CaptureKind,
    /// Note title: the ISO date for daily captures, the note name otherwise.
    pub title: String,
    pub path: PathBuf,
    /// Heading line of the new entry, e.g. `* 09:30`.
    pub heading: String,
    /// Whether this capture created the note.
    pub created_note: bool,
}

impl Display for CaptureReceipt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let verb = if self.created_note {
            "new note"
        } else {
            "note"
        };
        write!(
            f,
            "Captured {} entry `{}` into {verb} `{}` ({})",
            self.kind,
            self.heading.trim_start_matches("* "),
            self.title,
            self.path.display()
        )
    }
}

/// Behavior switches for `CaptureService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Bound for readiness polling after the daemon was spawned. Zero skips
    /// the wait.
    pub startup_wait: Duration,
    /// Wrap capitalized words in `[[...]]` links before appending.
    pub link_entities: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            startup_wait: Duration::from_secs(15),
            link_entities: false,
        }
    }
}

/// End-to-end capture facade.
pub struct CaptureService<'e, E: NoteEngine + ?Sized, C: DaemonControl, K: Clock> {
    engine: &'e E,
    supervisor: DaemonSupervisor<C>,
    clock: K,
    layout: NoteLayout,
    options: CaptureOptions,
}

impl<'e, E: NoteEngine + ?Sized, C: DaemonControl, K: Clock> CaptureService<'e, E, C, K> {
    pub fn new(
        engine: &'e E,
        supervisor: DaemonSupervisor<C>,
        clock: K,
        layout: NoteLayout,
        options: CaptureOptions,
    ) -> Self {
        Self {
            engine,
            supervisor,
            clock,
            layout,
            options,
        }
    }

    /// Files `request.content` into the daily note or the named note.
    ///
    /// # Errors
    /// - `Usage` for invalid requests, before any side effect.
    /// - `DaemonUnavailable` when an engine call cannot reach the daemon.
    /// - `CreationFailed` / `AppendFailed` when the engine rejects a call.
    pub fn capture(&self, request: &CaptureRequest) -> Result<CaptureReceipt, CaptureError> {
        let started_at = Instant::now();
        let target_name = request.target.as_deref().unwrap_or("-");
        info!(
            "event=capture module=service status=start kind={} target={} content_len={}",
            request.kind,
            target_name,
            request.content.len()
        );

        match self.run(request) {
            Ok(receipt) => {
                info!(
                    "event=capture module=service status=ok kind={} target={} created_note={} duration_ms={}",
                    request.kind,
                    receipt.title,
                    receipt.created_note,
                    started_at.elapsed().as_millis()
                );
                Ok(receipt)
            }
            Err(err) => {
                error!(
                    "event=capture module=service status=error kind={} target={} duration_ms={} error_code={} error={}",
                    request.kind,
                    target_name,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn run(&self, request: &CaptureRequest) -> Result<CaptureReceipt, CaptureError> {
        request.validate()?;

        let handle = self.supervisor.ensure();
        if handle.is_spawned()
            && !self.options.startup_wait.is_zero()
            && !self.supervisor.wait_ready(handle, self.options.startup_wait)
        {
            warn!(
                "event=capture module=service status=degraded reason=daemon_not_ready waited_ms={}",
                self.options.startup_wait.as_millis()
            );
        }

        let at = self.clock.now();
        let (target, title, created_named) = match request.kind {
            CaptureKind::Daily => (CaptureTarget::Daily, daily_key(at.date()), false),
            CaptureKind::Named => {
                let name = request.target.as_deref().unwrap_or_default();
                let resolved =
                    NoteResolver::new(self.engine, &self.layout.notes_dir).resolve_or_create(name)?;
                (
                    CaptureTarget::Note(resolved.path),
                    resolved.title,
                    resolved.created.is_some(),
                )
            }
        };

        let content = if self.options.link_entities {
            link_entities(&request.content)
        } else {
            request.content.clone()
        };

        let writer = EntryWriter::new(self.engine, &self.layout.daily_dir);
        let entry = writer.append(&target, &content, at)?;

        Ok(CaptureReceipt {
            kind: request.kind,
            title,
            path: entry.path,
            heading: entry.heading,
            created_note: created_named || entry.created.is_some(),
        })
    }
}
