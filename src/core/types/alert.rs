//! Alert types
//! 
//! What the aggregator hands to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::level::SeverityLevel;

/// Coarse presentation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    High,
    Critical,
}

/// Sound selector for an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSound {
    Positive,
    Negative,
}

/// Visual style class of a severity level (`ad-warn`, `ad-error`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleTag(pub SeverityLevel);

impl StyleTag {
    /// Level this style represents
    pub fn level(&self) -> SeverityLevel {
        self.0
    }

    /// CSS-like class name
    pub fn class_name(&self) -> String {
        format!("ad-{}", self.0.as_str())
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ad-{}", self.0.as_str())
    }
}

/// A single alert forwarded to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Level of the originating event
    pub level: SeverityLevel,

    /// Free-text message body
    pub message: String,

    /// Presentation priority
    pub urgency: Urgency,

    /// Optional sound
    pub sound: Option<AlertSound>,

    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Build an alert for an event, deriving urgency and sound from the level
    pub fn new(level: SeverityLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            urgency: level.urgency(),
            sound: level.sound(),
            timestamp: Utc::now(),
        }
    }
}
