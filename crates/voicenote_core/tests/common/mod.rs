#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use voicenote_core::engine::elisp;
use voicenote_core::model::note::render_front_matter;
use voicenote_core::{
    CaptureOptions, CaptureService, DaemonControl, DaemonSupervisor, EngineRequest, FixedClock,
    NoteEngine, NoteLayout, RpcError, RpcResult,
};

/// Applies engine requests directly to files, the way the Emacs server would.
#[derive(Default)]
pub struct FileEngine {
    calls: RefCell<Vec<&'static str>>,
    fail_on: Option<&'static str>,
    unreachable: bool,
}

impl FileEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every request of operation `op` with a remote error.
    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|call| **call == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl NoteEngine for FileEngine {
    fn evaluate(&self, request: &EngineRequest) -> RpcResult<String> {
        self.calls.borrow_mut().push(request.operation());
        if self.unreachable {
            return Err(RpcError::Unreachable(
                "emacsclient: can't find socket".to_string(),
            ));
        }
        if self.fail_on == Some(request.operation()) {
            return Err(RpcError::Remote {
                code: Some(1),
                diagnostic: "*ERROR*: Buffer is read-only".to_string(),
            });
        }

        match request {
            EngineRequest::Ping => Ok("t".to_string()),
            EngineRequest::CreateNote { path, id, title } => {
                if path.exists() {
                    return Ok(elisp::EXISTS.to_string());
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(remote)?;
                }
                fs::write(path, render_front_matter(*id, title)).map_err(remote)?;
                Ok(elisp::CREATED.to_string())
            }
            EngineRequest::AppendEntry { path, block } => {
                let mut text = fs::read_to_string(path).unwrap_or_default();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(block);
                fs::write(path, text).map_err(remote)?;
                Ok(elisp::APPENDED.to_string())
            }
        }
    }
}

fn remote(err: io::Error) -> RpcError {
    RpcError::Remote {
        code: None,
        diagnostic: err.to_string(),
    }
}

/// Daemon stub counting liveness checks and spawns.
///
/// A `starting` daemon fails its first check, accepts one spawn and then
/// answers after `checks_until_live` further failed checks.
pub struct StubDaemon {
    live: Cell<bool>,
    checks_until_live: Option<u32>,
    pub checks: Cell<u32>,
    pub spawns: Cell<u32>,
}

impl StubDaemon {
    pub fn live() -> Self {
        Self::with_state(true, None)
    }

    /// Never answers, whatever happens.
    pub fn dead() -> Self {
        Self::with_state(false, None)
    }

    pub fn starting(checks_until_live: u32) -> Self {
        Self::with_state(false, Some(checks_until_live))
    }

    fn with_state(live: bool, checks_until_live: Option<u32>) -> Self {
        Self {
            live: Cell::new(live),
            checks_until_live,
            checks: Cell::new(0),
            spawns: Cell::new(0),
        }
    }
}

impl DaemonControl for StubDaemon {
    fn probe(&self) -> bool {
        self.checks.set(self.checks.get() + 1);
        if self.live.get() {
            return true;
        }
        if let Some(failed_after_spawn) = self.checks_until_live {
            // The first check precedes the spawn and never counts.
            if self.spawns.get() > 0 && self.checks.get() > failed_after_spawn + 1 {
                self.live.set(true);
                return true;
            }
        }
        false
    }

    fn spawn(&self) -> io::Result<()> {
        self.spawns.set(self.spawns.get() + 1);
        Ok(())
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid fixture time")
}

pub fn layout(root: &Path) -> NoteLayout {
    NoteLayout {
        notes_dir: root.to_path_buf(),
        daily_dir: root.join("daily"),
    }
}

pub fn service<'e>(
    engine: &'e FileEngine,
    root: &Path,
    now: NaiveDateTime,
) -> CaptureService<'e, FileEngine, StubDaemon, FixedClock> {
    service_with(engine, root, now, StubDaemon::live(), CaptureOptions::default())
}

pub fn service_with<'e, C: DaemonControl>(
    engine: &'e FileEngine,
    root: &Path,
    now: NaiveDateTime,
    daemon: C,
    options: CaptureOptions,
) -> CaptureService<'e, FileEngine, C, FixedClock> {
    CaptureService::new(
        engine,
        DaemonSupervisor::new(daemon).with_poll_interval(Duration::from_millis(1)),
        FixedClock(now),
        layout(root),
        options,
    )
}

/// Entry heading lines (`* HH:MM`) in file order.
pub fn entry_headings(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| line.starts_with("* "))
        .map(str::to_string)
        .collect()
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("note file should be readable")
}
