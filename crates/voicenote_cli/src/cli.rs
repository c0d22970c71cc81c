//! Command-line surface of `capture`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use voicenote_core::{CaptureKind, CaptureRequest};

#[derive(Parser, Debug)]
#[command(
    name = "capture",
    version,
    about = "Dictate a note and file it into today's daily note or a named note"
)]
pub struct Cli {
    /// Config file; defaults to <config dir>/voicenote/config.toml.
    #[arg(long, global = true, env = "VOICENOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emacs server socket name.
    #[arg(long, global = true, env = "VOICENOTE_SOCKET")]
    pub socket_name: Option<String>,

    /// Upper bound in seconds for each call into the note engine.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: CaptureCommand,
}

#[derive(Subcommand, Debug)]
pub enum CaptureCommand {
    /// Append an entry to today's daily note.
    Daily {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Append an entry to a named note, creating it on first use.
    Note {
        /// Note name, e.g. "books/atomic_habits".
        name: String,
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Use this text instead of recording.
    #[arg(long)]
    pub text: Option<String>,

    /// Wrap capitalized words and phrases in [[...]] links.
    #[arg(long)]
    pub link_entities: bool,
}

impl CaptureCommand {
    pub fn kind(&self) -> CaptureKind {
        match self {
            Self::Daily { .. } => CaptureKind::Daily,
            Self::Note { .. } => CaptureKind::Named,
        }
    }

    pub fn input(&self) -> &InputArgs {
        match self {
            Self::Daily { input } | Self::Note { input, .. } => input,
        }
    }

    /// Builds the capture request for `content`.
    pub fn request(&self, content: impl Into<String>) -> CaptureRequest {
        match self {
            Self::Daily { .. } => CaptureRequest::daily(content),
            Self::Note { name, .. } => CaptureRequest::named(name.as_str(), content),
        }
    }
}
