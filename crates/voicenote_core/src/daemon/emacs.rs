//! Emacs server as the note-engine daemon.

use super::DaemonControl;
use crate::engine::{EmacsClientEngine, EngineRequest, NoteEngine};
use log::info;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Probes through `emacsclient`, spawns with `emacs --daemon`.
#[derive(Debug, Clone)]
pub struct EmacsDaemon {
    emacs_bin: PathBuf,
    socket_name: Option<String>,
    client: EmacsClientEngine,
}

impl EmacsDaemon {
    /// `client` is used only for the liveness probe and should target the
    /// same socket as `socket_name`.
    pub fn new(
        emacs_bin: impl Into<PathBuf>,
        socket_name: Option<String>,
        client: EmacsClientEngine,
    ) -> Self {
        Self {
            emacs_bin: emacs_bin.into(),
            socket_name,
            client,
        }
    }

    fn daemon_flag(&self) -> String {
        match &self.socket_name {
            Some(name) => format!("--daemon={name}"),
            None => "--daemon".to_string(),
        }
    }
}

impl DaemonControl for EmacsDaemon {
    fn probe(&self) -> bool {
        self.client.evaluate(&EngineRequest::Ping).is_ok()
    }

    fn spawn(&self) -> std::io::Result<()> {
        let mut command = Command::new(&self.emacs_bin);
        command
            .arg(self.daemon_flag())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: a Ctrl-C aimed at the capture must not reach
            // the daemon.
            command.process_group(0);
        }
        let child = command.spawn()?;
        info!(
            "event=daemon_spawn module=daemon status=ok pid={} bin={}",
            child.id(),
            self.emacs_bin.display()
        );
        Ok(())
    }
}
