//! Severity aggregator
//!
//! Folds leveled events into a single current severity:
//! - escalation is monotonic (a lower event never downgrades an active alert,
//!   an equal one restarts the blink)
//! - critical/error events are counted and each success resolves one of them;
//!   resolving the last one resets the indicator
//! - `success` alone never raises the level

use std::time::Instant;

use super::blink::{BlinkConfig, BlinkCycle};
use crate::core::error::InvalidLevel;
use crate::core::types::{Alert, SeverityLevel};
use crate::presentation::Presenter;

/// Aggregator of status events, owner of the presentation port
pub struct Aggregator<P> {
    presenter: P,
    current_level: SeverityLevel,
    critical_error_count: u32,
    blink: BlinkCycle,
}

impl<P: Presenter> Aggregator<P> {
    /// Create an aggregator at `Normal` with no cycle running
    pub fn new(presenter: P, blink: BlinkConfig) -> Self {
        Self {
            presenter,
            current_level: SeverityLevel::Normal,
            critical_error_count: 0,
            blink: BlinkCycle::new(blink),
        }
    }

    /// Current aggregated severity
    pub fn current_level(&self) -> SeverityLevel {
        self.current_level
    }

    /// Critical/error events not yet resolved by a success
    pub fn critical_error_count(&self) -> u32 {
        self.critical_error_count
    }

    /// Whether a blink cycle is in flight
    pub fn is_blinking(&self) -> bool {
        self.blink.is_blinking()
    }

    /// The blink cycle, for inspection
    pub fn blink(&self) -> &BlinkCycle {
        &self.blink
    }

    /// Presentation port
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Presentation port, mutably
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Record an event received as raw strings
    ///
    /// Unknown levels are rejected before anything changes.
    pub fn notify(&mut self, level: &str, message: &str, now: Instant) -> Result<(), InvalidLevel> {
        let level: SeverityLevel = level.parse()?;
        self.record(level, message, now);
        Ok(())
    }

    /// Record an event
    ///
    /// `Normal` is the reset sentinel: it resets and shows nothing.
    pub fn record(&mut self, level: SeverityLevel, message: &str, now: Instant) {
        if level == SeverityLevel::Normal {
            self.reset();
            return;
        }

        if self.resolve(level) {
            tracing::info!("All critical events resolved, resetting indicator");
            self.reset();
        } else if self.escalates(level) {
            self.escalate(level, now);
        }

        self.presenter.show_alert(&Alert::new(level, message));
    }

    /// Force the level back to `Normal`, cancel blinking and clear all styles
    pub fn reset(&mut self) {
        if self.current_level != SeverityLevel::Normal {
            tracing::info!("Severity reset from {}", self.current_level);
        }

        self.current_level = SeverityLevel::Normal;
        self.blink.cancel();
        self.presenter.clear_all_styles();
    }

    /// When the blink cycle next needs to run
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.blink.deadline()
    }

    /// Run the blink phase due at `now`
    pub fn on_wakeup(&mut self, now: Instant) {
        self.blink.on_wakeup(now, &mut self.presenter);
    }

    /// Update the failure count. Returns true when a success resolved the last one.
    fn resolve(&mut self, level: SeverityLevel) -> bool {
        if level.is_failure() {
            self.critical_error_count += 1;
            tracing::debug!("Unresolved critical events: {}", self.critical_error_count);
            return false;
        }

        if level == SeverityLevel::Success && self.critical_error_count > 0 {
            self.critical_error_count -= 1;
            tracing::debug!("Unresolved critical events: {}", self.critical_error_count);
            return self.critical_error_count == 0;
        }

        false
    }

    fn escalates(&self, level: SeverityLevel) -> bool {
        level > SeverityLevel::Success && level >= self.current_level
    }

    fn escalate(&mut self, level: SeverityLevel, now: Instant) {
        if level != self.current_level {
            tracing::info!("Severity escalated: {} -> {}", self.current_level, level);
        }

        self.presenter.clear_all_styles();
        self.current_level = level;
        self.blink.start(level.style_tag(), now, &mut self.presenter);
    }
}
