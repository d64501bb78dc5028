//! Presentation Module
//!
//! The port through which the severity aggregator reaches the desktop:
//! alerts go to the notification tray, styles go to the status indicator.

mod desktop;
mod indicator;
#[cfg(test)]
pub(crate) mod recording;

pub use desktop::{DesktopPresenter, DesktopPresenterConfig};
pub use indicator::{Indicator, IndicatorSnapshot};

use crate::core::types::{Alert, StyleTag};

/// Presentation port consumed by the aggregator
///
/// Implementations must not fail: display problems are logged and swallowed
/// so that a broken desktop never takes the bridge down.
pub trait Presenter {
    /// Show an alert in the notification tray
    fn show_alert(&mut self, alert: &Alert);

    /// Add a severity style to the indicator
    fn apply_style(&mut self, tag: StyleTag);

    /// Remove a severity style from the indicator
    fn clear_style(&mut self, tag: StyleTag);

    /// Remove every severity style from the indicator
    fn clear_all_styles(&mut self);
}
