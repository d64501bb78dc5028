//! Status indicator state
//!
//! Tracks which severity styles are applied to the indicator and renders a
//! snapshot that panel widgets (waybar/eww custom modules) can poll.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::types::{SeverityLevel, StyleTag};

/// Set of styles currently applied to the indicator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indicator {
    styles: BTreeSet<StyleTag>,
}

/// Serialized indicator state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Short label
    pub text: String,

    /// Last alert message, if any
    pub tooltip: String,

    /// Applied style classes, lowest level first
    pub class: Vec<String>,

    /// Highest applied level
    pub level: SeverityLevel,
}

impl Indicator {
    /// Create an indicator with no style applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a style. Returns true if the set changed.
    pub fn apply(&mut self, tag: StyleTag) -> bool {
        self.styles.insert(tag)
    }

    /// Remove a style. Returns true if the set changed.
    pub fn clear(&mut self, tag: StyleTag) -> bool {
        self.styles.remove(&tag)
    }

    /// Remove all styles. Returns true if the set changed.
    pub fn clear_all(&mut self) -> bool {
        let changed = !self.styles.is_empty();
        self.styles.clear();
        changed
    }

    /// Whether a style is applied
    pub fn contains(&self, tag: StyleTag) -> bool {
        self.styles.contains(&tag)
    }

    /// Whether no style is applied
    pub fn is_clear(&self) -> bool {
        self.styles.is_empty()
    }

    /// Highest applied level, `Normal` when clear
    pub fn level(&self) -> SeverityLevel {
        self.styles
            .iter()
            .next_back()
            .map(StyleTag::level)
            .unwrap_or_default()
    }

    /// Render the current state
    pub fn snapshot(&self, tooltip: Option<&str>) -> IndicatorSnapshot {
        let level = self.level();
        IndicatorSnapshot {
            text: if self.is_clear() {
                String::new()
            } else {
                level.as_str().to_string()
            },
            tooltip: tooltip.unwrap_or_default().to_string(),
            class: self.styles.iter().map(StyleTag::class_name).collect(),
            level,
        }
    }
}

impl IndicatorSnapshot {
    /// Write the snapshot as a single JSON line using temp file + rename
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_string(self)?;
        content.push('\n');

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)
    }
}
