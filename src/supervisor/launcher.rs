//! Process launching
//!
//! The [`Launcher`] port hides process spawning, exit watching and
//! termination requests from the supervisor state machine.

use std::collections::HashMap;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::core::error::LaunchError;

/// Parsed command line of the watched daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
}

impl CommandLine {
    /// Split a command line the way a POSIX shell would
    pub fn parse(command: &str) -> Result<Self, LaunchError> {
        let argv = shlex::split(command)
            .ok_or_else(|| LaunchError::new("invalid command line: unbalanced quotes", None))?;

        if argv.is_empty() {
            return Err(LaunchError::new("empty command line", None));
        }

        Ok(Self { argv })
    }

    /// Program to execute (looked up in PATH)
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Handle of a launched process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pub pid: u32,
}

/// Exit notification of a watched process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub pid: u32,

    /// Exit code, `None` when killed by a signal or when waiting failed
    pub code: Option<i32>,
}

/// Process launch port consumed by the supervisor
pub trait Launcher {
    /// Start the command without waiting for it
    fn launch(&mut self, command: &CommandLine) -> Result<ProcessHandle, LaunchError>;

    /// Arrange for exactly one [`ChildExit`] to be delivered when the process ends
    fn watch_termination(&mut self, handle: ProcessHandle);

    /// Ask the process to terminate. Does not wait for the exit.
    fn request_termination(&mut self, handle: ProcessHandle) -> Result<(), LaunchError>;
}

/// Launcher backed by `tokio::process`
///
/// Exits are delivered on the channel given at construction, so they are
/// handled on the same event loop as every other event.
pub struct TokioLauncher {
    exits: mpsc::UnboundedSender<ChildExit>,
    pending: HashMap<u32, Child>,
}

impl TokioLauncher {
    /// Create a launcher and the receiving end of its exit channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChildExit>) {
        let (exits, receiver) = mpsc::unbounded_channel();
        let launcher = Self {
            exits,
            pending: HashMap::new(),
        };
        (launcher, receiver)
    }
}

impl Launcher for TokioLauncher {
    fn launch(&mut self, command: &CommandLine) -> Result<ProcessHandle, LaunchError> {
        tracing::info!("Starting daemon: {:?}", command.argv);

        let child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn()?;

        let pid = child
            .id()
            .ok_or_else(|| LaunchError::new("daemon exited before its pid was known", None))?;

        self.pending.insert(pid, child);
        Ok(ProcessHandle { pid })
    }

    fn watch_termination(&mut self, handle: ProcessHandle) {
        let Some(mut child) = self.pending.remove(&handle.pid) else {
            tracing::warn!("No launched process with pid {} to watch", handle.pid);
            return;
        };

        let exits = self.exits.clone();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::warn!("Failed to wait for daemon (pid {}): {}", handle.pid, e);
                    None
                }
            };

            if exits.send(ChildExit { pid: handle.pid, code }).is_err() {
                tracing::debug!("Exit of pid {} observed after shutdown", handle.pid);
            }
        });
    }

    #[cfg(unix)]
    fn request_termination(&mut self, handle: ProcessHandle) -> Result<(), LaunchError> {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let pid = i32::try_from(handle.pid)
            .map_err(|_| LaunchError::new(format!("pid {} out of range", handle.pid), None))?;

        tracing::debug!("Sending SIGTERM to daemon (pid {})", handle.pid);
        kill(Pid::from_raw(pid), Signal::SIGTERM)
            .map_err(|errno| LaunchError::new(errno.desc(), Some(errno as i32)))
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self, handle: ProcessHandle) -> Result<(), LaunchError> {
        Err(LaunchError::new(
            format!("cannot signal pid {} on this platform", handle.pid),
            None,
        ))
    }
}
