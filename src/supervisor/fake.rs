//! Scripted launcher for tests

use std::collections::VecDeque;

use crate::core::error::LaunchError;
use crate::testing::CallLog;

use super::launcher::{CommandLine, Launcher, ProcessHandle};

/// Launcher that hands out sequential pids and records every call
#[derive(Debug, Default)]
pub struct FakeLauncher {
    next_pid: u32,
    /// Failures returned by upcoming launches, in order
    pub failures: VecDeque<LaunchError>,
    /// Failure returned by the next termination request
    pub termination_failure: Option<LaunchError>,
    pub launched: Vec<CommandLine>,
    pub watched: Vec<ProcessHandle>,
    pub terminations: Vec<ProcessHandle>,
    pub log: CallLog,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            next_pid: 100,
            ..Default::default()
        }
    }

    /// Launcher recording `launch` and `terminate` into a shared log
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::new()
        }
    }

    /// Make the next launch fail
    pub fn fail_next(&mut self, message: &str, code: Option<i32>) {
        self.failures.push_back(LaunchError::new(message, code));
    }

    /// Make the next termination request fail
    pub fn fail_next_termination(&mut self, message: &str, code: Option<i32>) {
        self.termination_failure = Some(LaunchError::new(message, code));
    }

    pub fn launch_count(&self) -> usize {
        self.launched.len()
    }
}

impl Launcher for FakeLauncher {
    fn launch(&mut self, command: &CommandLine) -> Result<ProcessHandle, LaunchError> {
        self.log.record("launch");
        if let Some(err) = self.failures.pop_front() {
            return Err(err);
        }
        self.launched.push(command.clone());
        self.next_pid += 1;
        Ok(ProcessHandle { pid: self.next_pid })
    }

    fn watch_termination(&mut self, handle: ProcessHandle) {
        self.watched.push(handle);
    }

    fn request_termination(&mut self, handle: ProcessHandle) -> Result<(), LaunchError> {
        self.log.record("terminate");
        if let Some(err) = self.termination_failure.take() {
            return Err(err);
        }
        self.terminations.push(handle);
        Ok(())
    }
}
