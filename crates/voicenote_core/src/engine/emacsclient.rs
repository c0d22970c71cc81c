//! `emacsclient`-backed note engine.
//!
//! # Responsibility
//! - Send one rendered expression per call to a running Emacs server.
//! - Bound every call by a timeout and classify its outcome.
//!
//! # Invariants
//! - A timed-out client is killed and reaped before returning.
//! - Client output is read while the client runs, so a full pipe never
//!   stalls it.
//! - Logged events carry the operation name and duration, never note text.

use super::{elisp, EngineRequest, NoteEngine, RpcError, RpcResult};
use log::{debug, warn};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

const UNREACHABLE_MARKERS: [&str; 4] = [
    "can't find socket",
    "no socket or alternate editor",
    "connection refused",
    "error accessing socket",
];

/// Note engine reached through the `emacsclient` program.
#[derive(Debug, Clone)]
pub struct EmacsClientEngine {
    client_bin: PathBuf,
    socket_name: Option<String>,
    timeout: Duration,
}

impl EmacsClientEngine {
    pub fn new(client_bin: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            client_bin: client_bin.into(),
            socket_name: None,
            timeout,
        }
    }

    /// Targets a named server socket instead of the default one.
    pub fn with_socket_name(mut self, socket_name: Option<String>) -> Self {
        self.socket_name = socket_name;
        self
    }

    fn command(&self, expression: &str) -> Command {
        let mut command = Command::new(&self.client_bin);
        if let Some(socket_name) = &self.socket_name {
            command.arg("--socket-name").arg(socket_name);
        }
        command
            .arg("--eval")
            .arg(expression)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl NoteEngine for EmacsClientEngine {
    fn evaluate(&self, request: &EngineRequest) -> RpcResult<String> {
        let started_at = Instant::now();
        let operation = request.operation();
        let expression = elisp::render(request);

        let mut child = self.command(&expression).spawn().map_err(|err| {
            warn!(
                "event=rpc_call module=engine status=error op={} error_code=launch_failed error={}",
                operation, err
            );
            RpcError::Launch(err)
        })?;
        let stdout = child.stdout.take().map(|out| spawn_reader(out, "stdout"));
        let stderr = child.stderr.take().map(|err| spawn_reader(err, "stderr"));

        // Readers are left detached on timeout; a surviving grandchild may
        // still hold the pipes open.
        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                warn!(
                    "event=rpc_call module=engine status=error op={} duration_ms={} error_code=timeout",
                    operation,
                    started_at.elapsed().as_millis()
                );
                return Err(RpcError::Timeout(self.timeout));
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RpcError::Remote {
                    code: None,
                    diagnostic: format!("failed waiting for engine client: {err}"),
                });
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        let duration_ms = started_at.elapsed().as_millis();

        match classify_exit(status, stdout, stderr) {
            Ok(output) => {
                debug!(
                    "event=rpc_call module=engine status=ok op={} duration_ms={}",
                    operation, duration_ms
                );
                Ok(output)
            }
            Err(err) => {
                warn!(
                    "event=rpc_call module=engine status=error op={} duration_ms={} error={}",
                    operation, duration_ms, err
                );
                Err(err)
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    mut pipe: R,
    stream: &'static str,
) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Err(err) = pipe.read_to_end(&mut buffer) {
            debug!("event=rpc_drain module=engine status=error stream={stream} error={err}");
        }
        buffer
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    let buffer = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    String::from_utf8_lossy(&buffer).into_owned()
}

fn classify_exit(status: ExitStatus, stdout: String, stderr: String) -> RpcResult<String> {
    if status.success() {
        return Ok(decode_output(&stdout));
    }
    Err(classify_failure(status.code(), &stderr))
}

/// Maps a failed client run to `Unreachable` or `Remote`.
pub(crate) fn classify_failure(code: Option<i32>, stderr: &str) -> RpcError {
    let diagnostic = stderr.trim().replace(['\n', '\r'], " ");
    let lowered = diagnostic.to_ascii_lowercase();
    if UNREACHABLE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return RpcError::Unreachable(diagnostic);
    }
    RpcError::Remote { code, diagnostic }
}

/// Strips the printed-representation quotes `emacsclient` puts around
/// string results.
pub(crate) fn decode_output(stdout: &str) -> String {
    let trimmed = stdout.trim_end_matches(['\n', '\r']);
    match trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_failure, decode_output, EmacsClientEngine};
    use crate::engine::{EngineRequest, NoteEngine, RpcError};
    use std::time::Duration;

    #[test]
    fn decode_output_unquotes_string_results() {
        assert_eq!(decode_output("\"appended\"\n"), "appended");
        assert_eq!(decode_output("t\n"), "t");
        assert_eq!(decode_output("\"say \\\"hi\\\"\""), "say \"hi\"");
    }

    #[test]
    fn missing_server_is_classified_unreachable() {
        let error = classify_failure(
            Some(1),
            "emacsclient: can't find socket; have you started the server?\n",
        );
        assert!(error.is_unreachable());
    }

    #[test]
    fn lisp_error_is_classified_remote() {
        match classify_failure(Some(1), "*ERROR*: Opening output file: Permission denied") {
            RpcError::Remote { code, diagnostic } => {
                assert_eq!(code, Some(1));
                assert!(diagnostic.contains("Permission denied"));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn missing_client_binary_is_a_launch_failure() {
        let engine = EmacsClientEngine::new(
            "/nonexistent/voicenote-test/emacsclient",
            Duration::from_secs(1),
        );
        let error = engine
            .evaluate(&EngineRequest::Ping)
            .expect_err("missing binary must fail");
        assert!(matches!(error, RpcError::Launch(_)));
        assert!(error.is_unreachable());
    }
}
