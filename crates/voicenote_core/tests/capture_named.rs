mod common;

use common::{at, entry_headings, read, service, service_with, FileEngine, StubDaemon};
use voicenote_core::{CaptureOptions, CaptureRequest, NoteResolver};

#[test]
fn named_capture_creates_note_with_fresh_id_and_verbatim_title() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::new();

    let receipt = service(&engine, dir.path(), at(2024, 6, 1, 10, 15))
        .capture(&CaptureRequest::named(
            "books/atomic_habits",
            "Chapter 1 thoughts",
        ))
        .unwrap();

    assert_eq!(receipt.path, dir.path().join("books_atomic_habits.org"));
    assert_eq!(receipt.title, "books/atomic_habits");
    assert!(receipt.created_note);
    assert!(!dir.path().join("books").exists());

    let text = read(&receipt.path);
    let id_line = text
        .lines()
        .find(|line| line.starts_with(":ID:"))
        .expect("front matter should carry an id");
    let id = id_line.trim_start_matches(":ID:").trim();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert!(text.contains("#+title: books/atomic_habits\n"));
    assert!(text.ends_with("* 10:15\nChapter 1 thoughts\n"));
}

#[test]
fn repeated_named_capture_appends_without_recreating() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::new();

    let first = service(&engine, dir.path(), at(2024, 6, 1, 10, 15))
        .capture(&CaptureRequest::named("books/atomic_habits", "Chapter 1 thoughts"))
        .unwrap();
    let header_before: Vec<String> = read(&first.path)
        .lines()
        .take(4)
        .map(str::to_string)
        .collect();

    let second = service(&engine, dir.path(), at(2024, 6, 1, 11, 0))
        .capture(&CaptureRequest::named("books/atomic_habits", "Chapter 2 thoughts"))
        .unwrap();

    assert_eq!(first.path, second.path);
    assert!(!second.created_note);
    assert_eq!(engine.calls("create_note"), 1);
    assert_eq!(
        entry_headings(&second.path),
        vec!["* 10:15".to_string(), "* 11:00".to_string()]
    );
    let text = read(&second.path);
    let header_after: Vec<String> = text.lines().take(4).map(str::to_string).collect();
    assert_eq!(header_before, header_after);
    assert!(text.ends_with("* 10:15\nChapter 1 thoughts\n* 11:00\nChapter 2 thoughts\n"));
}

#[test]
fn resolve_or_create_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::new();
    let resolver = NoteResolver::new(&engine, dir.path());

    let first = resolver.resolve_or_create("Rust Ownership").unwrap();
    let second = resolver.resolve_or_create("Rust Ownership").unwrap();

    assert_eq!(first.path, second.path);
    assert!(first.created.is_some());
    assert!(second.created.is_none());
    assert_eq!(engine.calls("create_note"), 1);
}

#[test]
fn existing_note_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inbox.org");
    std::fs::write(&path, ":PROPERTIES:\n:ID:       keep-me\n:END:\n#+title: Inbox\n\n").unwrap();
    let engine = FileEngine::new();

    let receipt = service(&engine, dir.path(), at(2024, 6, 1, 12, 0))
        .capture(&CaptureRequest::named("Inbox", "remember milk"))
        .unwrap();

    assert_eq!(receipt.path, path);
    assert_eq!(engine.calls("create_note"), 0);
    let text = read(&path);
    assert!(text.contains(":ID:       keep-me\n"));
    assert!(text.ends_with("* 12:00\nremember milk\n"));
}

#[test]
fn entity_linking_is_applied_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::new();
    let options = CaptureOptions {
        link_entities: true,
        ..CaptureOptions::default()
    };

    let receipt = service_with(
        &engine,
        dir.path(),
        at(2024, 6, 1, 14, 45),
        StubDaemon::live(),
        options,
    )
    .capture(&CaptureRequest::named("people", "lunch with Ada Lovelace"))
    .unwrap();

    assert!(read(&receipt.path).ends_with("* 14:45\nlunch with [[Ada Lovelace]]\n"));
}

#[test]
fn content_is_appended_verbatim_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FileEngine::new();

    let receipt = service(&engine, dir.path(), at(2024, 6, 1, 14, 45))
        .capture(&CaptureRequest::named("people", "lunch with \"Ada\" \\ Lovelace"))
        .unwrap();

    assert!(read(&receipt.path).ends_with("* 14:45\nlunch with \"Ada\" \\ Lovelace\n"));
}
