//! Core capture logic for voice notes.
//! This crate owns daemon supervision, note resolution and entry appends;
//! recording and argument parsing live in the CLI.

pub mod clock;
pub mod config;
pub mod daemon;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CaptureConfig, ConfigError};
pub use daemon::{DaemonControl, DaemonHandle, DaemonStatus, DaemonSupervisor, EmacsDaemon};
pub use engine::{EmacsClientEngine, EngineRequest, NoteEngine, RpcError, RpcResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    CaptureKind, CaptureRequest, CaptureTarget, NoteId, NoteLayout, RequestError,
};
pub use repo::note_resolver::{NoteResolver, ResolveError, ResolvedNote};
pub use service::capture_service::{
    CaptureError, CaptureOptions, CaptureReceipt, CaptureService,
};
pub use service::entry_writer::{AppendedEntry, EntryWriter};
pub use service::linking::link_entities;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
