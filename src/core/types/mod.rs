//! Core data types for status-bridge
//! 
//! This module defines the fundamental data structures shared by the sink,
//! the severity aggregator and the presentation layer.

pub mod alert;
pub mod level;

// Re-export commonly used types
pub use alert::{Alert, AlertSound, StyleTag, Urgency};
pub use level::SeverityLevel;
