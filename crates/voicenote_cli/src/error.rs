//! CLI error envelope and exit-code mapping.

use crate::recorder::RecorderError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use voicenote_core::{CaptureError, ConfigError};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_DAEMON_UNAVAILABLE: u8 = 3;
pub const EXIT_CREATION_FAILED: u8 = 4;
pub const EXIT_APPEND_FAILED: u8 = 5;
pub const EXIT_RECORDER_FAILED: u8 = 6;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Recorder(RecorderError),
    Capture(CaptureError),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_FAILURE,
            Self::Recorder(_) => EXIT_RECORDER_FAILED,
            Self::Capture(err) => match err {
                CaptureError::Usage(_) => EXIT_USAGE,
                CaptureError::DaemonUnavailable { .. } => EXIT_DAEMON_UNAVAILABLE,
                CaptureError::CreationFailed { .. } => EXIT_CREATION_FAILED,
                CaptureError::AppendFailed { .. } => EXIT_APPEND_FAILED,
            },
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Recorder(err) => write!(f, "{err}"),
            Self::Capture(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Recorder(err) => Some(err),
            Self::Capture(err) => Some(err),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RecorderError> for CliError {
    fn from(value: RecorderError) -> Self {
        Self::Recorder(value)
    }
}

impl From<CaptureError> for CliError {
    fn from(value: CaptureError) -> Self {
        Self::Capture(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, EXIT_APPEND_FAILED, EXIT_DAEMON_UNAVAILABLE, EXIT_USAGE};
    use std::path::PathBuf;
    use voicenote_core::{CaptureError, RpcError};

    #[test]
    fn capture_errors_map_to_distinct_exit_codes() {
        let usage = CliError::from(CaptureError::Usage("missing name".to_string()));
        assert_eq!(usage.exit_code(), EXIT_USAGE);

        let unavailable = CliError::from(CaptureError::DaemonUnavailable {
            target: "2024-06-01".to_string(),
            source: RpcError::Unreachable("can't find socket".to_string()),
        });
        assert_eq!(unavailable.exit_code(), EXIT_DAEMON_UNAVAILABLE);

        let append = CliError::from(CaptureError::AppendFailed {
            path: PathBuf::from("/notes/a.org"),
            source: RpcError::Remote {
                code: Some(1),
                diagnostic: "read-only".to_string(),
            },
        });
        assert_eq!(append.exit_code(), EXIT_APPEND_FAILED);
        assert!(!append.to_string().contains('\n'));
    }
}
