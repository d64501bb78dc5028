//! Supervisor tests

use tokio::sync::mpsc::UnboundedReceiver;

use super::fake::FakeLauncher;
use super::*;
use crate::bus::{BridgeEvent, NotificationSink};
use crate::core::error::SupervisorError;
use crate::core::types::SeverityLevel;

fn supervisor() -> (Supervisor<FakeLauncher>, UnboundedReceiver<BridgeEvent>) {
    supervisor_with(FakeLauncher::new())
}

fn supervisor_with(
    launcher: FakeLauncher,
) -> (Supervisor<FakeLauncher>, UnboundedReceiver<BridgeEvent>) {
    let (sink, events) = NotificationSink::channel();
    let config = SupervisorConfig::new("alwaysdata-daemon --foreground");
    (Supervisor::new(config, launcher, sink), events)
}

fn drain(events: &mut UnboundedReceiver<BridgeEvent>) -> Vec<(SeverityLevel, String)> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BridgeEvent::Notify { level, body } = event {
            out.push((level, body));
        }
    }
    out
}

fn crash(supervisor: &Supervisor<FakeLauncher>) -> ChildExit {
    let handle = supervisor.handle().expect("daemon should be running");
    ChildExit {
        pid: handle.pid,
        code: Some(1),
    }
}

#[test]
fn test_start_launches_and_watches() {
    let (mut supervisor, mut events) = supervisor();

    supervisor.start(false).unwrap();

    assert_eq!(supervisor.state(), SupervisorState::Running);
    assert!(supervisor.is_running());
    assert_eq!(supervisor.launcher().launch_count(), 1);
    assert_eq!(supervisor.launcher().watched.len(), 1);
    assert_eq!(supervisor.launcher().launched[0].program(), "alwaysdata-daemon");
    assert_eq!(supervisor.launcher().launched[0].args(), ["--foreground"]);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn test_start_with_notification() {
    let (mut supervisor, mut events) = supervisor();

    supervisor.start(true).unwrap();

    assert_eq!(
        drain(&mut events),
        vec![(SeverityLevel::Success, DAEMON_RUNNING_MESSAGE.to_string())]
    );
}

#[test]
fn test_start_twice_keeps_one_instance() {
    let (mut supervisor, _events) = supervisor();

    supervisor.start(false).unwrap();
    let first = supervisor.handle();
    supervisor.start(false).unwrap();

    assert_eq!(supervisor.handle(), first);
    assert_eq!(supervisor.launcher().launch_count(), 1);
}

#[test]
fn test_crashes_restart_until_ceiling() {
    let (mut supervisor, mut events) = supervisor();
    supervisor.start(false).unwrap();

    let outcome = supervisor.on_termination(crash(&supervisor)).unwrap();
    assert_eq!(outcome, TerminationOutcome::Restarted);
    assert_eq!(supervisor.abnormal_stop_count(), 1);

    let outcome = supervisor.on_termination(crash(&supervisor)).unwrap();
    assert_eq!(outcome, TerminationOutcome::Restarted);
    assert_eq!(supervisor.abnormal_stop_count(), 2);

    let err = supervisor.on_termination(crash(&supervisor)).unwrap_err();
    assert_eq!(err, SupervisorError::AbnormalTerminationExceeded { count: 3 });

    assert_eq!(supervisor.state(), SupervisorState::Failed);
    assert!(!supervisor.is_running());
    assert_eq!(supervisor.launcher().launch_count(), 3);
    assert_eq!(
        drain(&mut events),
        vec![
            (SeverityLevel::Success, DAEMON_RUNNING_MESSAGE.to_string()),
            (SeverityLevel::Success, DAEMON_RUNNING_MESSAGE.to_string()),
            (SeverityLevel::Warn, DAEMON_DOWN_MESSAGE.to_string()),
        ]
    );
}

#[test]
fn test_requested_stop_is_not_a_crash() {
    let (mut supervisor, mut events) = supervisor();
    supervisor.start(false).unwrap();
    supervisor.on_termination(crash(&supervisor)).unwrap();
    assert_eq!(supervisor.abnormal_stop_count(), 1);
    drain(&mut events);

    let handle = supervisor.handle().unwrap();
    supervisor.stop();
    assert_eq!(supervisor.state(), SupervisorState::Stopping);
    assert!(supervisor.stop_requested());
    assert_eq!(supervisor.abnormal_stop_count(), 0);
    assert_eq!(supervisor.launcher().terminations, vec![handle]);

    let outcome = supervisor
        .on_termination(ChildExit {
            pid: handle.pid,
            code: None,
        })
        .unwrap();

    assert_eq!(outcome, TerminationOutcome::Stopped);
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(!supervisor.stop_requested());
    assert!(!supervisor.is_running());
    assert_eq!(supervisor.launcher().launch_count(), 2);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn test_stop_twice_signals_once() {
    let (mut supervisor, _events) = supervisor();
    supervisor.start(false).unwrap();

    supervisor.stop();
    supervisor.stop();

    assert_eq!(supervisor.launcher().terminations.len(), 1);
}

#[test]
fn test_failed_stop_keeps_crash_handling() {
    let (mut supervisor, mut events) = supervisor();
    supervisor.start(false).unwrap();
    supervisor.on_termination(crash(&supervisor)).unwrap();
    drain(&mut events);
    supervisor
        .launcher_mut()
        .fail_next_termination("Operation not permitted (os error 1)", Some(1));

    supervisor.stop();

    assert_eq!(supervisor.state(), SupervisorState::Running);
    assert!(!supervisor.stop_requested());
    assert!(supervisor.launcher().terminations.is_empty());
    assert_eq!(supervisor.abnormal_stop_count(), 1);

    let outcome = supervisor.on_termination(crash(&supervisor)).unwrap();

    assert_eq!(outcome, TerminationOutcome::Restarted);
    assert_eq!(supervisor.abnormal_stop_count(), 2);
    assert_eq!(
        drain(&mut events),
        vec![(SeverityLevel::Success, DAEMON_RUNNING_MESSAGE.to_string())]
    );

    // a later stop can still be requested
    supervisor.stop();
    assert_eq!(supervisor.state(), SupervisorState::Stopping);
}

#[test]
fn test_stop_when_not_running() {
    let (mut supervisor, _events) = supervisor();

    supervisor.stop();

    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(!supervisor.stop_requested());
    assert!(supervisor.launcher().terminations.is_empty());
}

#[test]
fn test_launch_failure_is_not_retried() {
    let mut launcher = FakeLauncher::new();
    launcher.fail_next("No such file or directory (os error 2)", Some(2));
    let (mut supervisor, mut events) = supervisor_with(launcher);

    let err = supervisor.start(false).unwrap_err();

    assert_eq!(err.message, "No such file or directory");
    assert_eq!(err.code, Some(2));
    assert_eq!(supervisor.state(), SupervisorState::Failed);
    assert!(!supervisor.is_running());
    assert_eq!(supervisor.launcher().launch_count(), 0);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn test_invalid_command_line() {
    let (sink, _events) = NotificationSink::channel();
    let mut supervisor = Supervisor::new(
        SupervisorConfig::new("daemon 'unterminated"),
        FakeLauncher::new(),
        sink,
    );

    assert!(supervisor.start(false).is_err());
    assert_eq!(supervisor.state(), SupervisorState::Failed);
}

#[test]
fn test_restart_failure_reports_error() {
    let (mut supervisor, mut events) = supervisor();
    supervisor.start(false).unwrap();
    let exit = crash(&supervisor);
    supervisor
        .launcher_mut()
        .fail_next("Permission denied (os error 13)", Some(13));

    let err = supervisor.on_termination(exit).unwrap_err();

    assert!(matches!(err, SupervisorError::Launch(_)));
    assert_eq!(supervisor.state(), SupervisorState::Failed);
    assert_eq!(
        drain(&mut events),
        vec![(
            SeverityLevel::Error,
            "Failed to restart daemon: Permission denied".to_string()
        )]
    );
}

#[test]
fn test_stale_exit_is_ignored() {
    let (mut supervisor, mut events) = supervisor();
    supervisor.start(false).unwrap();
    let running = supervisor.handle();

    let outcome = supervisor
        .on_termination(ChildExit {
            pid: 4242,
            code: Some(0),
        })
        .unwrap();

    assert_eq!(outcome, TerminationOutcome::Ignored);
    assert_eq!(supervisor.handle(), running);
    assert_eq!(supervisor.abnormal_stop_count(), 0);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn test_manual_start_after_failure() {
    let mut launcher = FakeLauncher::new();
    launcher.fail_next("Permission denied", Some(13));
    let (mut supervisor, _events) = supervisor_with(launcher);

    assert!(supervisor.start(false).is_err());
    supervisor.start(true).unwrap();

    assert_eq!(supervisor.state(), SupervisorState::Running);
}
