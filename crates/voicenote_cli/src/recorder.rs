//! Recording helper invocation.
//!
//! # Responsibility
//! - Run the external recorder with the capture mode token.
//! - Return its standard output as the transcribed text.
//!
//! # Invariants
//! - Empty output is valid content; only launch failures and non-zero exits
//!   are errors.
//! - Transcribed text is never logged, only its length.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::process::{Command, Stdio};
use std::time::Instant;
use voicenote_core::CaptureKind;

#[derive(Debug)]
pub enum RecorderError {
    Launch {
        program: String,
        source: std::io::Error,
    },
    Failed {
        program: String,
        code: Option<i32>,
        diagnostic: String,
    },
}

impl Display for RecorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Launch { program, source } => {
                write!(f, "failed to start recorder `{program}`: {source}")
            }
            Self::Failed {
                program,
                code,
                diagnostic,
            } => {
                let code = code.map_or_else(|| "signal".to_string(), |code| code.to_string());
                if diagnostic.is_empty() {
                    write!(f, "recorder `{program}` failed (exit={code})")
                } else {
                    write!(f, "recorder `{program}` failed (exit={code}): {diagnostic}")
                }
            }
        }
    }
}

impl Error for RecorderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Launch { source, .. } => Some(source),
            Self::Failed { .. } => None,
        }
    }
}

/// External transcription program plus its fixed leading arguments.
#[derive(Debug, Clone)]
pub struct Recorder {
    program: String,
    args: Vec<String>,
}

impl Recorder {
    /// Splits `command` into program and fixed arguments.
    ///
    /// Returns `None` for an empty command.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Records one dictation in `kind` mode and returns the transcription.
    ///
    /// Blocks until the recorder exits. Its stdin stays attached to the
    /// terminal so it can be stopped interactively.
    pub fn record(&self, kind: CaptureKind) -> Result<String, RecorderError> {
        let started_at = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(kind.as_str())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| RecorderError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or_default()
                .trim()
                .to_string();
            error!(
                "event=record module=cli status=error mode={} duration_ms={} exit={:?}",
                kind,
                started_at.elapsed().as_millis(),
                output.status.code()
            );
            return Err(RecorderError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                diagnostic,
            });
        }

        let text = String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\n', '\r'])
            .to_string();
        info!(
            "event=record module=cli status=ok mode={} duration_ms={} content_len={}",
            kind,
            started_at.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }
}
