//! Supervisor Module
//!
//! Keeps exactly one instance of the watched daemon alive. Intentional stops
//! are told apart from crashes; crashes are retried up to a ceiling, launch
//! failures are reported and never retried.

pub mod diagnostic;
pub mod launcher;
pub mod process;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(test)]
mod tests;

pub use diagnostic::normalize_diagnostic;
pub use launcher::{ChildExit, CommandLine, Launcher, ProcessHandle, TokioLauncher};
pub use process::{
    Supervisor, SupervisorConfig, SupervisorState, TerminationOutcome, DAEMON_DOWN_MESSAGE,
    DAEMON_RUNNING_MESSAGE, DEFAULT_MAX_ABNORMAL_STOPS,
};
