//! Daemon supervisor
//!
//! State machine over a single watched process. Termination is observed
//! asynchronously, so an explicit stop is remembered in `stop_requested`
//! until the matching exit arrives.

use crate::bus::NotificationSink;
use crate::core::error::{LaunchError, SupervisorError};
use crate::core::types::SeverityLevel;

use super::launcher::{ChildExit, CommandLine, Launcher, ProcessHandle};

/// Abnormal stops tolerated before supervision pauses
pub const DEFAULT_MAX_ABNORMAL_STOPS: u32 = 3;

/// Status line sent when the daemon is (re)started
pub const DAEMON_RUNNING_MESSAGE: &str = "Daemon running";

/// Status line sent when supervision gives up
pub const DAEMON_DOWN_MESSAGE: &str = "Daemon is not running, check the logs";

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Command line of the watched daemon
    pub command: String,

    /// Abnormal stops tolerated before giving up
    pub max_abnormal_stops: u32,
}

impl SupervisorConfig {
    /// Configuration for a command with the default retry ceiling
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            max_abnormal_stops: DEFAULT_MAX_ABNORMAL_STOPS,
        }
    }
}

/// Supervisor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No process, nothing pending
    Idle,
    /// Process running and watched
    Running,
    /// Termination requested, exit not yet observed
    Stopping,
    /// Launch failed or retry ceiling reached; waits for an explicit start
    Failed,
}

/// What a termination event led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// Requested stop completed
    Stopped,
    /// Crash handled by starting a new instance
    Restarted,
    /// Exit of a process this supervisor no longer tracks
    Ignored,
}

/// Supervisor of the watched daemon
pub struct Supervisor<L> {
    config: SupervisorConfig,
    launcher: L,
    sink: NotificationSink,
    state: SupervisorState,
    handle: Option<ProcessHandle>,
    abnormal_stop_count: u32,
    stop_requested: bool,
}

impl<L: Launcher> Supervisor<L> {
    /// Create an idle supervisor
    pub fn new(config: SupervisorConfig, launcher: L, sink: NotificationSink) -> Self {
        Self {
            config,
            launcher,
            sink,
            state: SupervisorState::Idle,
            handle: None,
            abnormal_stop_count: 0,
            stop_requested: false,
        }
    }

    /// Get current supervisor state
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Whether a process is running
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Handle of the running process
    pub fn handle(&self) -> Option<ProcessHandle> {
        self.handle
    }

    /// Crashes since the last intentional stop
    pub fn abnormal_stop_count(&self) -> u32 {
        self.abnormal_stop_count
    }

    /// Whether a stop is waiting for its exit event
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// The launcher, for inspection
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    #[cfg(test)]
    pub(crate) fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    /// Launch the daemon
    ///
    /// Does nothing while a process is already tracked. Launch failures are
    /// returned to the caller and never retried here.
    pub fn start(&mut self, notify_on_success: bool) -> Result<(), LaunchError> {
        if let Some(handle) = self.handle {
            tracing::debug!("Daemon already tracked (pid {}), start ignored", handle.pid);
            return Ok(());
        }

        let handle = match CommandLine::parse(&self.config.command)
            .and_then(|command| self.launcher.launch(&command))
        {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!("Failed to start daemon: {} (code {:?})", e.message, e.code);
                self.state = SupervisorState::Failed;
                return Err(e);
            }
        };

        self.launcher.watch_termination(handle);
        self.handle = Some(handle);
        self.state = SupervisorState::Running;
        tracing::info!("Daemon started (pid {})", handle.pid);

        if notify_on_success {
            self.sink.submit(SeverityLevel::Success, DAEMON_RUNNING_MESSAGE);
        }

        Ok(())
    }

    /// Ask the daemon to stop
    ///
    /// Returns immediately; the exit arrives later through [`on_termination`](Self::on_termination).
    /// When the termination request cannot be delivered, the supervisor stays
    /// `Running` and a later exit is handled as a crash.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle else {
            return;
        };

        if self.stop_requested {
            tracing::debug!("Stop already requested for pid {}", handle.pid);
            return;
        }

        tracing::info!("Stopping daemon (pid {})", handle.pid);

        if let Err(e) = self.launcher.request_termination(handle) {
            // No exit is coming: the next one is still a crash
            tracing::warn!("Failed to signal daemon (pid {}): {}", handle.pid, e);
            return;
        }

        self.stop_requested = true;
        self.abnormal_stop_count = 0;
        self.state = SupervisorState::Stopping;
    }

    /// Handle the exit of the watched process
    ///
    /// A requested stop just clears the flag. A crash is counted and either
    /// restarted or, at the ceiling, reported once and left down.
    pub fn on_termination(&mut self, exit: ChildExit) -> Result<TerminationOutcome, SupervisorError> {
        match self.handle {
            Some(handle) if handle.pid == exit.pid => {}
            _ => {
                tracing::debug!("Ignoring exit of untracked pid {}", exit.pid);
                return Ok(TerminationOutcome::Ignored);
            }
        }

        self.handle = None;

        if self.stop_requested {
            self.stop_requested = false;
            self.state = SupervisorState::Idle;
            tracing::info!("Daemon stopped (pid {}, code {:?})", exit.pid, exit.code);
            return Ok(TerminationOutcome::Stopped);
        }

        self.abnormal_stop_count += 1;
        tracing::warn!(
            "Daemon exited unexpectedly (pid {}, code {:?}), abnormal stop {}/{}",
            exit.pid,
            exit.code,
            self.abnormal_stop_count,
            self.config.max_abnormal_stops
        );

        if self.abnormal_stop_count >= self.config.max_abnormal_stops {
            self.state = SupervisorState::Failed;
            self.sink.submit(SeverityLevel::Warn, DAEMON_DOWN_MESSAGE);
            return Err(SupervisorError::AbnormalTerminationExceeded {
                count: self.abnormal_stop_count,
            });
        }

        self.state = SupervisorState::Idle;
        match self.start(true) {
            Ok(()) => Ok(TerminationOutcome::Restarted),
            Err(e) => {
                self.sink
                    .submit(SeverityLevel::Error, format!("Failed to restart daemon: {}", e));
                Err(e.into())
            }
        }
    }
}
