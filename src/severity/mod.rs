//! Severity Module
//!
//! Aggregates a stream of leveled status events into a single current
//! severity, with escalation, count-based self-healing and a time-boxed
//! blink cycle that draws attention to new alerts.
//!
//! The module is sans-IO: callers pass the current [`Instant`](std::time::Instant)
//! in and sleep until [`Aggregator::next_wakeup`] themselves.

pub mod aggregator;
pub mod blink;


pub use aggregator::Aggregator;
pub use blink::{BlinkConfig, BlinkCycle, BlinkState, DEFAULT_BLINK_DURATION_MS, DEFAULT_BLINK_FREQUENCY_HZ};
