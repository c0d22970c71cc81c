//! Note resolver over the engine boundary.
//!
//! # Responsibility
//! - Compute the canonical storage name of an identifier.
//! - Look the file up and create it with front matter when absent.
//!
//! # Invariants
//! - `storage_name` depends only on the identifier string.
//! - Path separators inside an identifier are part of the note name and
//!   never become directories.
//! - A note's `NoteId` is generated here, once, right before creation.

use crate::engine::{elisp, EngineRequest, NoteEngine, RpcError};
use crate::model::note::NoteId;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

const NOTE_EXTENSION: &str = "org";

/// Resolver failure.
#[derive(Debug)]
pub enum ResolveError {
    /// Identifier has no characters usable in a storage name.
    InvalidIdentifier(String),
    /// Engine call that should have created the note failed.
    CreationFailed {
        identifier: String,
        source: RpcError,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(identifier) => {
                write!(f, "note name {identifier:?} has no usable characters")
            }
            Self::CreationFailed { identifier, source } => {
                write!(f, "failed to create note {identifier:?}: {source}")
            }
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentifier(_) => None,
            Self::CreationFailed { source, .. } => Some(source),
        }
    }
}

/// A note file that exists after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNote {
    pub path: PathBuf,
    pub title: String,
    /// Set only when this resolution created the note.
    pub created: Option<NoteId>,
}

/// Derives the file name for `identifier`.
///
/// Rules:
/// - Letters and digits are lowercased and kept, `-` is kept.
/// - Every other run of characters (spaces, `/`, punctuation) becomes one `_`.
/// - Leading and trailing `_` are trimmed, then `.org` is appended.
///
/// Returns `None` when nothing usable is left.
pub fn storage_name(identifier: &str) -> Option<String> {
    let mut slug = String::with_capacity(identifier.len());
    let mut pending_separator = false;
    for ch in identifier.chars() {
        if ch.is_alphanumeric() || ch == '-' {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        return None;
    }
    Some(format!("{slug}.{NOTE_EXTENSION}"))
}

/// Full path of `identifier` under `root`.
pub fn note_path(root: &Path, identifier: &str) -> Option<PathBuf> {
    storage_name(identifier).map(|name| root.join(name))
}

/// Read-only existence check for a note file.
pub fn note_exists(path: &Path) -> bool {
    path.is_file()
}

/// Resolves identifiers to note files below one root directory.
pub struct NoteResolver<E: NoteEngine> {
    engine: E,
    root: PathBuf,
}

impl<E: NoteEngine> NoteResolver<E> {
    pub fn new(engine: E, root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            root: root.into(),
        }
    }

    /// Returns the note file for `identifier`, creating it when missing.
    ///
    /// # Side effects
    /// - At most one `CreateNote` engine call, only when the file is absent.
    /// - Emits `note_create` logging events on creation.
    pub fn resolve_or_create(&self, identifier: &str) -> Result<ResolvedNote, ResolveError> {
        let title = identifier.trim();
        let path = note_path(&self.root, title)
            .ok_or_else(|| ResolveError::InvalidIdentifier(identifier.to_string()))?;

        if note_exists(&path) {
            return Ok(ResolvedNote {
                path,
                title: title.to_string(),
                created: None,
            });
        }

        let started_at = Instant::now();
        let id = Uuid::new_v4();
        let request = EngineRequest::CreateNote {
            path: path.clone(),
            id,
            title: title.to_string(),
        };

        match self.engine.evaluate(&request) {
            Ok(output) => {
                // Another invocation may have created it between the lookup
                // and this call; the engine then leaves the file alone.
                let created = (output != elisp::EXISTS).then_some(id);
                info!(
                    "event=note_create module=repo status=ok created={} path={} duration_ms={}",
                    created.is_some(),
                    path.display(),
                    started_at.elapsed().as_millis()
                );
                Ok(ResolvedNote {
                    path,
                    title: title.to_string(),
                    created,
                })
            }
            Err(source) => {
                error!(
                    "event=note_create module=repo status=error path={} duration_ms={} error_code=create_failed error={}",
                    path.display(),
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(ResolveError::CreationFailed {
                    identifier: title.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{note_path, storage_name};
    use std::path::Path;

    #[test]
    fn storage_name_folds_separators_into_one_name() {
        assert_eq!(
            storage_name("books/atomic_habits").as_deref(),
            Some("books_atomic_habits.org")
        );
        assert_eq!(
            storage_name("  Rust  Ownership!! ").as_deref(),
            Some("rust_ownership.org")
        );
    }

    #[test]
    fn storage_name_keeps_iso_dates_intact() {
        assert_eq!(storage_name("2024-06-01").as_deref(), Some("2024-06-01.org"));
    }

    #[test]
    fn storage_name_is_deterministic_and_keeps_unicode_letters() {
        assert_eq!(storage_name("Café Notes"), storage_name("Café Notes"));
        assert_eq!(storage_name("Café Notes").as_deref(), Some("café_notes.org"));
    }

    #[test]
    fn storage_name_rejects_identifiers_without_usable_characters() {
        assert_eq!(storage_name(""), None);
        assert_eq!(storage_name(" /// ..."), None);
    }

    #[test]
    fn note_path_never_nests_directories() {
        let path = note_path(Path::new("/notes"), "a/b/c").expect("usable identifier");
        assert_eq!(path, Path::new("/notes/a_b_c.org"));
    }
}
