//! Presenter that records every call, for tests

use std::collections::BTreeSet;

use super::Presenter;
use crate::core::types::{Alert, SeverityLevel, StyleTag};
use crate::testing::CallLog;

/// One call made on the presentation port
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    Alert(Alert),
    Apply(StyleTag),
    Clear(StyleTag),
    ClearAll,
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
    pub styles: BTreeSet<StyleTag>,
    pub log: CallLog,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presenter that also records `clear_all` into a shared log
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn alerts(&self) -> Vec<&Alert> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PresenterCall::Alert(alert) => Some(alert),
                _ => None,
            })
            .collect()
    }

    pub fn applies_of(&self, level: SeverityLevel) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PresenterCall::Apply(tag) if tag.level() == level))
            .count()
    }

    pub fn clear_all_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, PresenterCall::ClearAll))
            .count()
    }

    pub fn has_style(&self, level: SeverityLevel) -> bool {
        self.styles.contains(&level.style_tag())
    }

    pub fn take_calls(&mut self) -> Vec<PresenterCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Presenter for RecordingPresenter {
    fn show_alert(&mut self, alert: &Alert) {
        self.calls.push(PresenterCall::Alert(alert.clone()));
    }

    fn apply_style(&mut self, tag: StyleTag) {
        self.styles.insert(tag);
        self.calls.push(PresenterCall::Apply(tag));
    }

    fn clear_style(&mut self, tag: StyleTag) {
        self.styles.remove(&tag);
        self.calls.push(PresenterCall::Clear(tag));
    }

    fn clear_all_styles(&mut self) {
        self.styles.clear();
        self.calls.push(PresenterCall::ClearAll);
        self.log.record("clear_all");
    }
}
