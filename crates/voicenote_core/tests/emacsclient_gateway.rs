#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use voicenote_core::{EmacsClientEngine, EngineRequest, NoteEngine, RpcError};

fn stub_client(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// One test so stub scripts are never written while another test forks.
#[test]
fn gateway_classifies_client_outcomes() {
    let dir = tempfile::tempdir().unwrap();

    let echo_args = stub_client(
        dir.path(),
        "echo-args",
        r#"printf '%s|' "$@" > "$(dirname "$0")/args.txt"; echo '"appended"'"#,
    );
    let engine = EmacsClientEngine::new(&echo_args, Duration::from_secs(5))
        .with_socket_name(Some("notes".to_string()));
    let output = engine
        .evaluate(&EngineRequest::AppendEntry {
            path: PathBuf::from("/notes/a.org"),
            block: "* 09:00\nhello\n".to_string(),
        })
        .unwrap();
    assert_eq!(output, "appended");
    let args = fs::read_to_string(dir.path().join("args.txt")).unwrap();
    assert!(args.starts_with("--socket-name|notes|--eval|(with-current-buffer"));

    let no_server = stub_client(
        dir.path(),
        "no-server",
        "echo \"emacsclient: can't find socket; have you started the server?\" >&2; exit 1",
    );
    let error = EmacsClientEngine::new(&no_server, Duration::from_secs(5))
        .evaluate(&EngineRequest::Ping)
        .unwrap_err();
    assert!(matches!(error, RpcError::Unreachable(_)), "{error:?}");

    let lisp_error = stub_client(
        dir.path(),
        "lisp-error",
        "echo '*ERROR*: Wrong type argument' >&2; exit 1",
    );
    let error = EmacsClientEngine::new(&lisp_error, Duration::from_secs(5))
        .evaluate(&EngineRequest::Ping)
        .unwrap_err();
    assert!(matches!(error, RpcError::Remote { code: Some(1), .. }), "{error:?}");

    // Larger than a pipe buffer on both streams; the client must not stall.
    let chatty = stub_client(
        dir.path(),
        "chatty",
        "head -c 200000 /dev/zero | tr '\\0' e >&2; head -c 200000 /dev/zero | tr '\\0' a",
    );
    let started_at = Instant::now();
    let output = EmacsClientEngine::new(&chatty, Duration::from_secs(5))
        .evaluate(&EngineRequest::Ping)
        .unwrap();
    assert_eq!(output.len(), 200_000);
    assert!(output.bytes().all(|byte| byte == b'a'));
    assert!(started_at.elapsed() < Duration::from_secs(5));

    let hanging = stub_client(dir.path(), "hanging", "exec sleep 30");
    let started_at = Instant::now();
    let error = EmacsClientEngine::new(&hanging, Duration::from_millis(200))
        .evaluate(&EngineRequest::Ping)
        .unwrap_err();
    assert!(matches!(error, RpcError::Timeout(_)), "{error:?}");
    assert!(started_at.elapsed() < Duration::from_secs(10));
}
