//! Capture domain model.
//!
//! # Responsibility
//! - Define the note, entry and capture-request shapes used by core logic.
//! - Own the pure text formats written into note files.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` assigned once at creation.
//! - Entries are append-only; nothing here models editing or deletion.

pub mod note;
