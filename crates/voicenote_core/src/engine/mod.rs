//! RPC gateway into the long-lived note engine.
//!
//! # Responsibility
//! - Define the one-method `NoteEngine` contract used for every note mutation.
//! - Describe remote operations as typed `EngineRequest` values.
//! - Classify remote failures into `RpcError` variants.
//!
//! # Invariants
//! - Call sites never build remote expressions by hand; rendering and quoting
//!   live in `elisp` only.
//! - A failed call is reported once; this layer never retries.

use crate::model::note::NoteId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub mod elisp;
mod emacsclient;

pub use emacsclient::EmacsClientEngine;

pub type RpcResult<T> = Result<T, RpcError>;

/// One remote operation understood by the note engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineRequest {
    /// Trivial evaluation used as a liveness probe.
    Ping,
    /// Writes front matter into a new note file. Leaves existing files alone.
    CreateNote {
        path: PathBuf,
        id: NoteId,
        title: String,
    },
    /// Appends one pre-rendered entry block at the end of a note and saves it.
    AppendEntry { path: PathBuf, block: String },
}

impl EngineRequest {
    /// Short operation name used in log events.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::CreateNote { .. } => "create_note",
            Self::AppendEntry { .. } => "append_entry",
        }
    }
}

/// Failure of a single remote call.
#[derive(Debug)]
pub enum RpcError {
    /// The client program could not be started.
    Launch(std::io::Error),
    /// The call did not finish within the configured bound.
    Timeout(Duration),
    /// The client ran but could not reach a running engine.
    Unreachable(String),
    /// The engine evaluated the request and reported an error.
    Remote { code: Option<i32>, diagnostic: String },
}

impl RpcError {
    /// Whether the failure means no engine answered at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Launch(_) | Self::Unreachable(_))
    }
}

impl Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch(err) => write!(f, "failed to launch engine client: {err}"),
            Self::Timeout(limit) => {
                write!(f, "engine call timed out after {}ms", limit.as_millis())
            }
            Self::Unreachable(diagnostic) => write!(f, "engine unreachable: {diagnostic}"),
            Self::Remote { code, diagnostic } => match code {
                Some(code) => write!(f, "engine call failed (exit={code}): {diagnostic}"),
                None => write!(f, "engine call failed: {diagnostic}"),
            },
        }
    }
}

impl Error for RpcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Launch(err) => Some(err),
            _ => None,
        }
    }
}

/// Synchronous request/response boundary to the note engine.
///
/// Implementations block until the engine answers or the call fails.
pub trait NoteEngine {
    /// Evaluates one request and returns the engine's textual result.
    fn evaluate(&self, request: &EngineRequest) -> RpcResult<String>;
}

impl<E: NoteEngine + ?Sized> NoteEngine for &E {
    fn evaluate(&self, request: &EngineRequest) -> RpcResult<String> {
        (**self).evaluate(request)
    }
}
