//! Notification sink dispatch

use tokio::sync::mpsc;

use crate::core::error::InvalidLevel;
use crate::core::types::SeverityLevel;
use crate::core::utils::{single_line, truncate_string};

/// Event delivered to the controller loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A status notification
    Notify { level: SeverityLevel, body: String },
    /// The user acknowledged the indicator
    Acknowledge,
}

/// Entry point for status events
///
/// Cheap to clone; every clone feeds the same event loop.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    events: mpsc::UnboundedSender<BridgeEvent>,
}

impl NotificationSink {
    /// Create a sink and the receiver the event loop drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BridgeEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { events }, receiver)
    }

    /// Accept a notification from the wire
    ///
    /// The level is validated here, so a rejected call never reaches the loop.
    pub fn notify(&self, level: &str, body: &str) -> Result<(), InvalidLevel> {
        let level: SeverityLevel = level.parse()?;
        self.submit(level, body);
        Ok(())
    }

    /// Submit a notification from an in-process source
    pub fn submit(&self, level: SeverityLevel, body: impl Into<String>) {
        let body = body.into();
        tracing::debug!(
            "Notification received: {} {}",
            level,
            truncate_string(&single_line(&body), 80)
        );
        self.send(BridgeEvent::Notify { level, body });
    }

    /// Request a reset of the indicator
    pub fn acknowledge(&self) {
        self.send(BridgeEvent::Acknowledge);
    }

    /// Whether the event loop is gone
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    fn send(&self, event: BridgeEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Notification sink closed, event dropped");
        }
    }
}
