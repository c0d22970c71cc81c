//! Capture configuration.
//!
//! # Responsibility
//! - Load `CaptureConfig` from TOML with defaults for every field.
//! - Expand `~` and validate paths before any component sees them.
//!
//! # Invariants
//! - A missing default config file means "use defaults"; a missing explicit
//!   file is an error.
//! - Validated configs hold absolute note directories and a non-zero timeout.

use crate::model::note::NoteLayout;
use crate::service::capture_service::CaptureOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "voicenote";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        /// 1-based line of the offending value, when known.
        line: Option<usize>,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, line, source } => {
                // `toml` renders a multi-line snippet; keep only the message.
                let message = source.message().trim().replace(['\n', '\r'], " ");
                match line {
                    Some(line) => write!(
                        f,
                        "invalid config `{}` at line {line}: {message}",
                        path.display()
                    ),
                    None => write!(f, "invalid config `{}`: {message}", path.display()),
                }
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

/// User configuration for the capture tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Directory holding named notes.
    pub notes_dir: PathBuf,
    /// Directory holding daily notes. Defaults to `<notes_dir>/daily`.
    pub daily_dir: Option<PathBuf>,
    pub emacs_bin: PathBuf,
    pub emacsclient_bin: PathBuf,
    /// Emacs server socket name; `None` uses the server default.
    pub socket_name: Option<String>,
    /// Upper bound for one engine call.
    pub timeout_secs: u64,
    /// Readiness wait after spawning the daemon. Zero disables it.
    pub startup_wait_secs: u64,
    /// Recording helper program followed by fixed arguments. The mode token
    /// is appended per capture.
    pub recorder: Vec<String>,
    pub link_entities: bool,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            notes_dir: PathBuf::from("~/org-roam"),
            daily_dir: None,
            emacs_bin: PathBuf::from("emacs"),
            emacsclient_bin: PathBuf::from("emacsclient"),
            socket_name: None,
            timeout_secs: 10,
            startup_wait_secs: 15,
            recorder: vec!["record_voice".to_string()],
            link_entities: false,
            log_level: None,
            log_dir: None,
        }
    }
}

impl CaptureConfig {
    /// Loads config from `explicit`, or from the default location when it
    /// exists, then expands and validates it.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.finalize()
    }

    /// Parses TOML text without touching the file system.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            line: source
                .span()
                .and_then(|span| text.get(..span.start))
                .map(|prefix| prefix.matches('\n').count() + 1),
            source,
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Expands `~` in path fields and checks value ranges.
    pub fn finalize(mut self) -> Result<Self, ConfigError> {
        self.notes_dir = expand_home(&self.notes_dir)?;
        self.daily_dir = self.daily_dir.as_deref().map(expand_home).transpose()?;
        self.log_dir = self.log_dir.as_deref().map(expand_home).transpose()?;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.recorder.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "recorder must name a program".to_string(),
            ));
        }
        if let Some(socket_name) = &self.socket_name {
            if socket_name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "socket_name cannot be empty".to_string(),
                ));
            }
        }
        let layout = self.layout();
        for (field, dir) in [
            ("notes_dir", &layout.notes_dir),
            ("daily_dir", &layout.daily_dir),
        ] {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be an absolute path, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> NoteLayout {
        NoteLayout {
            notes_dir: self.notes_dir.clone(),
            daily_dir: self
                .daily_dir
                .clone()
                .unwrap_or_else(|| self.notes_dir.join("daily")),
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            startup_wait: Duration::from_secs(self.startup_wait_secs),
            link_entities: self.link_entities,
        }
    }

    /// Log directory, falling back to the platform data directory.
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(|| {
            dirs::data_local_dir().map(|dir| dir.join(APP_DIR_NAME).join("logs"))
        })
    }
}

/// `<config_dir>/voicenote/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Invalid(format!(
            "cannot expand `{}`: home directory unknown",
            path.display()
        ))
    })?;
    Ok(home.join(rest))
}
