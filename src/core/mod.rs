//! status-bridge core module
//! 
//! This module contains the pieces shared by every component:
//! - Error types and handling
//! - Severity levels and alert types
//! - Utility functions

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use error::{BridgeError, BusError, InvalidLevel, LaunchError, Result, SupervisorError};
pub use types::{Alert, AlertSound, SeverityLevel, StyleTag, Urgency};
