//! Capture use-case services.
//!
//! # Responsibility
//! - Orchestrate daemon supervision, note resolution and entry appends.
//! - Translate lower-layer failures into the `CaptureError` taxonomy.
//!
//! # Invariants
//! - Every note mutation goes through the engine boundary.
//! - A capture either fully succeeds or reports exactly one error.

pub mod capture_service;
pub mod entry_writer;
pub mod linking;
