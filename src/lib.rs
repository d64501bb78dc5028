//! status-bridge - desktop status bridge for a watched daemon
//!
//! This crate provides:
//! - A D-Bus notification sink accepting leveled status messages
//! - A severity aggregator driving a blinking desktop indicator
//! - Supervision of the daemon process with bounded crash restarts
//! - Desktop notifications with urgency and sounds per level

pub mod bus;
pub mod config;
pub mod controller;
pub mod core;
pub mod logging;
pub mod presentation;
pub mod severity;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used items
pub use bus::{BridgeEvent, DbusEndpoint, NotificationSink, SinkEndpoint};
pub use config::{AppConfig, ConfigStore, ConfigStoreConfig};
pub use controller::Controller;
pub use core::error::{BridgeError, Result};
pub use core::types::{Alert, SeverityLevel, StyleTag};
pub use presentation::{DesktopPresenter, Presenter};
pub use severity::Aggregator;
pub use supervisor::{Supervisor, TokioLauncher};
