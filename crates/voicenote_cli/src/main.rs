//! `capture`: dictate a note and file it through the Emacs note engine.
//!
//! # Responsibility
//! - Parse arguments, load config and start logging.
//! - Obtain content from `--text` or the recording helper.
//! - Run one capture and map its outcome to one output line and exit code.

mod cli;
mod error;
mod recorder;

use clap::Parser;
use cli::Cli;
use error::CliError;
use log::info;
use recorder::Recorder;
use std::process::ExitCode;
use voicenote_core::{
    default_log_level, init_logging, CaptureConfig, CaptureError, CaptureService,
    DaemonSupervisor, EmacsClientEngine, EmacsDaemon, SystemClock,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("capture: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let mut config = CaptureConfig::load(cli.config.as_deref())?;
    if let Some(socket_name) = cli.socket_name.as_deref().map(str::trim) {
        if !socket_name.is_empty() {
            config.socket_name = Some(socket_name.to_string());
        }
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    start_logging(&config);

    let kind = cli.command.kind();
    // Reject a bad invocation before the user spends time dictating.
    cli.command.request(String::new()).validate().map_err(CaptureError::from)?;

    let input = cli.command.input();
    let content = match &input.text {
        Some(text) => text.clone(),
        None => {
            let recorder = Recorder::from_command(&config.recorder).ok_or_else(|| {
                CaptureError::Usage("no recorder configured; pass --text".to_string())
            })?;
            recorder.record(kind)?
        }
    };
    let request = cli.command.request(content);

    let mut options = config.capture_options();
    options.link_entities |= input.link_entities;

    let engine = EmacsClientEngine::new(&config.emacsclient_bin, config.rpc_timeout())
        .with_socket_name(config.socket_name.clone());
    let daemon = EmacsDaemon::new(&config.emacs_bin, config.socket_name.clone(), engine.clone());
    let service = CaptureService::new(
        &engine,
        DaemonSupervisor::new(daemon),
        SystemClock,
        config.layout(),
        options,
    );

    let receipt = service.capture(&request)?;
    Ok(receipt.to_string())
}

fn start_logging(config: &CaptureConfig) {
    let level = config.log_level.as_deref().unwrap_or(default_log_level());
    let Some(log_dir) = config.resolved_log_dir() else {
        return;
    };
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("capture: logging disabled: {err}");
        return;
    }
    info!(
        "event=config module=cli status=ok notes_dir={} socket={} timeout_secs={}",
        config.notes_dir.display(),
        config.socket_name.as_deref().unwrap_or("default"),
        config.timeout_secs
    );
}
