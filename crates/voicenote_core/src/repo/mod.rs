//! Note lookup and lazy creation.
//!
//! # Responsibility
//! - Map note identifiers to storage paths with pure functions.
//! - Materialize missing notes through the engine, never by writing files
//!   directly.
//!
//! # Invariants
//! - Resolving the same identifier twice never creates two notes.
//! - Absence always triggers creation; there is no not-found error.

pub mod note_resolver;
