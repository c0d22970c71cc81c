//! Note-engine daemon supervision.
//!
//! # Responsibility
//! - Make sure one long-lived engine process is running before captures.
//! - Report what `ensure` did as a plain `DaemonHandle` value.
//!
//! # Invariants
//! - A live daemon is never restarted or touched.
//! - `ensure` never blocks on daemon readiness and never fails; spawn errors
//!   surface later as RPC failures.
//! - Readiness polling is opt-in through `wait_ready` and always bounded.

use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

mod emacs;

pub use emacs::EmacsDaemon;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Probe and spawn primitives for one kind of daemon.
pub trait DaemonControl {
    /// Returns `true` when the daemon answers a trivial request.
    fn probe(&self) -> bool;
    /// Starts the daemon detached from the caller. Must not wait for it.
    fn spawn(&self) -> std::io::Result<()>;
}

impl<C: DaemonControl + ?Sized> DaemonControl for &C {
    fn probe(&self) -> bool {
        (**self).probe()
    }

    fn spawn(&self) -> std::io::Result<()> {
        (**self).spawn()
    }
}

/// What `DaemonSupervisor::ensure` observed or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    /// The probe succeeded; nothing was started.
    AlreadyRunning,
    /// The probe failed and a new daemon was launched.
    Spawned,
    /// The probe failed and launching a daemon failed too.
    SpawnFailed,
}

impl DaemonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyRunning => "running",
            Self::Spawned => "spawned",
            Self::SpawnFailed => "spawn_failed",
        }
    }
}

/// Outcome of one `ensure` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonHandle {
    pub status: DaemonStatus,
}

impl DaemonHandle {
    /// Whether this call started the daemon.
    pub fn is_spawned(&self) -> bool {
        self.status == DaemonStatus::Spawned
    }
}

/// Idempotent probe-then-spawn supervisor.
pub struct DaemonSupervisor<C: DaemonControl> {
    control: C,
    poll_interval: Duration,
}

impl<C: DaemonControl> DaemonSupervisor<C> {
    pub fn new(control: C) -> Self {
        Self {
            control,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the delay between readiness probes.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Probes the daemon and spawns it when the probe fails.
    ///
    /// # Side effects
    /// - May start exactly one detached daemon process.
    /// - Emits `daemon_ensure` logging events.
    pub fn ensure(&self) -> DaemonHandle {
        let started_at = Instant::now();
        let status = if self.control.probe() {
            DaemonStatus::AlreadyRunning
        } else {
            match self.control.spawn() {
                Ok(()) => DaemonStatus::Spawned,
                Err(err) => {
                    warn!(
                        "event=daemon_ensure module=daemon status=error duration_ms={} error_code=spawn_failed error={}",
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return DaemonHandle {
                        status: DaemonStatus::SpawnFailed,
                    };
                }
            }
        };

        info!(
            "event=daemon_ensure module=daemon status=ok state={} duration_ms={}",
            status.as_str(),
            started_at.elapsed().as_millis()
        );
        DaemonHandle { status }
    }

    /// Polls the probe after a spawn until it answers or `timeout` expires.
    ///
    /// Returns `true` immediately for an already running daemon and `false`
    /// immediately when the spawn failed.
    pub fn wait_ready(&self, handle: DaemonHandle, timeout: Duration) -> bool {
        match handle.status {
            DaemonStatus::AlreadyRunning => return true,
            DaemonStatus::SpawnFailed => return false,
            DaemonStatus::Spawned => {}
        }

        let started_at = Instant::now();
        loop {
            if self.control.probe() {
                info!(
                    "event=daemon_ready module=daemon status=ok waited_ms={}",
                    started_at.elapsed().as_millis()
                );
                return true;
            }
            let elapsed = started_at.elapsed();
            if elapsed >= timeout {
                warn!(
                    "event=daemon_ready module=daemon status=error waited_ms={} error_code=startup_timeout",
                    elapsed.as_millis()
                );
                return false;
            }
            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }
}
