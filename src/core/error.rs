//! Error types for status-bridge
//!
//! The aggregator never fails on well-formed input; every other failure is
//! local to the supervisor's launch path or to the bus plumbing and is
//! reported upward, never treated as fatal.

use thiserror::Error;

/// Result type alias for status-bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for status-bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid level: {0}")]
    Level(#[from] InvalidLevel),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A level string outside the closed set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity level {level:?} (expected one of success, notice, info, warn, critical, error)")]
pub struct InvalidLevel {
    pub level: String,
}

/// The watched daemon could not be launched
///
/// `message` is already normalized (see
/// [`normalize_diagnostic`](crate::supervisor::normalize_diagnostic)).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LaunchError {
    /// Human-readable diagnostic without wrapper noise
    pub message: String,

    /// Platform error code, when the OS reported one
    pub code: Option<i32>,
}

impl LaunchError {
    /// Build a launch error from a raw diagnostic
    pub fn new(message: impl AsRef<str>, code: Option<i32>) -> Self {
        Self {
            message: crate::supervisor::normalize_diagnostic(message.as_ref()),
            code,
        }
    }
}

impl From<std::io::Error> for LaunchError {
    fn from(err: std::io::Error) -> Self {
        LaunchError::new(err.to_string(), err.raw_os_error())
    }
}

/// Supervisor errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("Failed to launch daemon: {0}")]
    Launch(#[from] LaunchError),

    #[error("Daemon stopped abnormally {count} times, supervision paused")]
    AbnormalTerminationExceeded { count: u32 },
}

/// Notification sink endpoint errors
#[derive(Error, Debug)]
pub enum BusError {
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Invalid bus address: {reason}")]
    InvalidAddress { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_from_io() {
        let io = std::io::Error::from_raw_os_error(2);
        let err = LaunchError::from(io);
        assert_eq!(err.code, Some(2));
        assert!(!err.message.contains("os error"));
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = SupervisorError::AbnormalTerminationExceeded { count: 3 };
        assert!(err.to_string().contains('3'));

        let err = InvalidLevel {
            level: "loud".to_string(),
        };
        assert!(err.to_string().contains("loud"));

        let launch = LaunchError::new("No such file or directory", Some(2));
        let err: BridgeError = SupervisorError::from(launch).into();
        assert!(err.to_string().contains("No such file or directory"));
    }
}
