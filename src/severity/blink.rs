//! Blink cycle state machine
//!
//! Alternates a style on and off every half period until the configured
//! duration is used up. Each phase is a single scheduled wakeup; nothing here
//! sleeps or spawns.

use std::time::{Duration, Instant};

use crate::core::types::StyleTag;
use crate::presentation::Presenter;

/// Default total blink duration
pub const DEFAULT_BLINK_DURATION_MS: u64 = 2000;

/// Default blink frequency
pub const DEFAULT_BLINK_FREQUENCY_HZ: u32 = 8;

/// Blink cycle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkConfig {
    /// Total time budget of one cycle
    pub duration: Duration,

    /// On/off toggles per second
    pub frequency_hz: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(DEFAULT_BLINK_DURATION_MS),
            frequency_hz: DEFAULT_BLINK_FREQUENCY_HZ,
        }
    }
}

impl BlinkConfig {
    /// Time between two phase changes (`1000 / F` ms)
    pub fn half_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frequency_hz.max(1)))
    }
}

/// Phase of the cycle
///
/// `On` means the style is applied and the next wakeup turns it off; `Off`
/// means the opposite. `remaining` is the budget left after the last ON phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkState {
    Idle,
    On { remaining: Duration },
    Off { remaining: Duration },
}

/// A restartable blink cycle
#[derive(Debug, Clone)]
pub struct BlinkCycle {
    config: BlinkConfig,
    state: BlinkState,
    tag: Option<StyleTag>,
    deadline: Option<Instant>,
    on_phases: u32,
}

impl BlinkCycle {
    /// Create an idle cycle
    pub fn new(config: BlinkConfig) -> Self {
        Self {
            config,
            state: BlinkState::Idle,
            tag: None,
            deadline: None,
            on_phases: 0,
        }
    }

    /// Current phase
    pub fn state(&self) -> BlinkState {
        self.state
    }

    /// Whether a cycle is in flight (a wakeup is pending)
    pub fn is_blinking(&self) -> bool {
        self.state != BlinkState::Idle
    }

    /// When the next phase change is due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Style of the running or last cycle
    pub fn tag(&self) -> Option<StyleTag> {
        self.tag
    }

    /// Number of ON phases executed by the running or last cycle
    pub fn on_phases(&self) -> u32 {
        self.on_phases
    }

    /// Cancel any running cycle, then start a new one with its first ON phase
    pub fn start<P: Presenter>(&mut self, tag: StyleTag, now: Instant, presenter: &mut P) {
        self.cancel();
        self.tag = Some(tag);
        self.on_phases = 0;
        tracing::debug!("Blink cycle started: {}", tag);
        self.phase_on(self.config.duration, now, presenter);
    }

    /// Drop the pending wakeup. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_blinking() {
            return false;
        }

        self.state = BlinkState::Idle;
        self.deadline = None;
        tracing::debug!("Blink cycle cancelled");
        true
    }

    /// Run the phase that is due. Early or spurious wakeups do nothing.
    pub fn on_wakeup<P: Presenter>(&mut self, now: Instant, presenter: &mut P) {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return,
        }

        match self.state {
            BlinkState::Idle => {}
            BlinkState::On { remaining } => self.phase_off(remaining, now, presenter),
            BlinkState::Off { remaining } => self.phase_on(remaining, now, presenter),
        }
    }

    fn phase_on<P: Presenter>(&mut self, remaining: Duration, now: Instant, presenter: &mut P) {
        let Some(tag) = self.tag else {
            return;
        };

        presenter.apply_style(tag);
        self.on_phases += 1;

        let half_period = self.config.half_period();
        let remaining = remaining.saturating_sub(half_period * 2);

        if remaining > Duration::ZERO {
            self.state = BlinkState::On { remaining };
            self.deadline = Some(now + half_period);
            return;
        }

        // Low levels only flash; warn and above keep the indicator lit
        if !tag.level().is_persistent() {
            presenter.clear_style(tag);
        }
        self.state = BlinkState::Idle;
        self.deadline = None;
        tracing::debug!(
            "Blink cycle finished after {} pairs: {} {}",
            self.on_phases,
            tag,
            if tag.level().is_persistent() { "retained" } else { "cleared" }
        );
    }

    fn phase_off<P: Presenter>(&mut self, remaining: Duration, now: Instant, presenter: &mut P) {
        let Some(tag) = self.tag else {
            return;
        };

        presenter.clear_style(tag);
        self.state = BlinkState::Off { remaining };
        self.deadline = Some(now + self.config.half_period());
    }
}
