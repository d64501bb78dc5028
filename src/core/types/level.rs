//! Severity levels
//! 
//! The closed, totally ordered set of levels a status event can carry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::alert::{AlertSound, StyleTag, Urgency};
use crate::core::error::InvalidLevel;

/// Severity of a status event
///
/// The declaration order is the escalation order. `Normal` is the reset
/// sentinel: it is never accepted from the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    #[default]
    Normal,
    Success,
    Notice,
    Info,
    Warn,
    Critical,
    Error,
}

impl SeverityLevel {
    /// Every level that may arrive over the bus, in escalation order
    pub const WIRE_LEVELS: [SeverityLevel; 6] = [
        SeverityLevel::Success,
        SeverityLevel::Notice,
        SeverityLevel::Info,
        SeverityLevel::Warn,
        SeverityLevel::Critical,
        SeverityLevel::Error,
    ];

    /// Numeric rank (0 for the sentinel, 6 for error)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Name used on the wire and in style tags
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Normal => "normal",
            SeverityLevel::Success => "success",
            SeverityLevel::Notice => "notice",
            SeverityLevel::Info => "info",
            SeverityLevel::Warn => "warn",
            SeverityLevel::Critical => "critical",
            SeverityLevel::Error => "error",
        }
    }

    /// Presentation priority of alerts at this level
    pub fn urgency(&self) -> Urgency {
        match self {
            SeverityLevel::Normal
            | SeverityLevel::Success
            | SeverityLevel::Notice
            | SeverityLevel::Info => Urgency::Normal,
            SeverityLevel::Warn => Urgency::High,
            SeverityLevel::Critical | SeverityLevel::Error => Urgency::Critical,
        }
    }

    /// Sound played with alerts at this level, if any
    pub fn sound(&self) -> Option<AlertSound> {
        match self {
            SeverityLevel::Success => Some(AlertSound::Positive),
            SeverityLevel::Critical | SeverityLevel::Error => Some(AlertSound::Negative),
            _ => None,
        }
    }

    /// Whether the indicator style stays applied once the blink cycle ends
    pub fn is_persistent(&self) -> bool {
        *self >= SeverityLevel::Warn
    }

    /// Whether events at this level count as unresolved failures
    pub fn is_failure(&self) -> bool {
        matches!(self, SeverityLevel::Critical | SeverityLevel::Error)
    }

    /// Visual style class associated with this level
    pub fn style_tag(&self) -> StyleTag {
        StyleTag(*self)
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = InvalidLevel;

    /// Parse a wire level. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::WIRE_LEVELS
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| InvalidLevel {
                level: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        let mut previous = SeverityLevel::Normal;
        for level in SeverityLevel::WIRE_LEVELS {
            assert!(level > previous);
            assert_eq!(level.rank(), previous.rank() + 1);
            previous = level;
        }
    }

    #[test]
    fn test_parse_wire_levels() {
        for level in SeverityLevel::WIRE_LEVELS {
            assert_eq!(level.as_str().parse::<SeverityLevel>().unwrap(), level);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_sentinel() {
        for raw in ["normal", "_normal", "WARN", "Warn", "warning", "", " info"] {
            let err = raw.parse::<SeverityLevel>().unwrap_err();
            assert_eq!(err.level, raw);
        }
    }

    #[test]
    fn test_urgency_and_sound_mapping() {
        assert_eq!(SeverityLevel::Success.urgency(), Urgency::Normal);
        assert_eq!(SeverityLevel::Notice.urgency(), Urgency::Normal);
        assert_eq!(SeverityLevel::Info.urgency(), Urgency::Normal);
        assert_eq!(SeverityLevel::Warn.urgency(), Urgency::High);
        assert_eq!(SeverityLevel::Critical.urgency(), Urgency::Critical);
        assert_eq!(SeverityLevel::Error.urgency(), Urgency::Critical);

        assert_eq!(SeverityLevel::Success.sound(), Some(AlertSound::Positive));
        assert_eq!(SeverityLevel::Critical.sound(), Some(AlertSound::Negative));
        assert_eq!(SeverityLevel::Error.sound(), Some(AlertSound::Negative));
        assert_eq!(SeverityLevel::Notice.sound(), None);
        assert_eq!(SeverityLevel::Warn.sound(), None);
    }

    #[test]
    fn test_persistence_threshold() {
        assert!(!SeverityLevel::Info.is_persistent());
        assert!(SeverityLevel::Warn.is_persistent());
        assert!(SeverityLevel::Error.is_persistent());
    }
}
