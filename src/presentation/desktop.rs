//! Desktop presenter
//!
//! Shows alerts as freedesktop notifications (notify-rust) and mirrors the
//! indicator style set into a JSON state file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use notify_rust::{Hint, Notification, Timeout};

use super::indicator::{Indicator, IndicatorSnapshot};
use super::Presenter;
use crate::config::AlertConfig;
use crate::core::types::{Alert, AlertSound, StyleTag, Urgency};
use crate::core::utils::{single_line, truncate_string};

/// Desktop presenter settings
#[derive(Debug, Clone)]
pub struct DesktopPresenterConfig {
    /// Application name reported to the notification server
    pub app_name: String,

    /// Summary line of every notification
    pub summary: String,

    /// Icon name
    pub icon: String,

    /// Sound file for positive alerts
    pub positive_sound: Option<PathBuf>,

    /// Sound file for negative alerts
    pub negative_sound: Option<PathBuf>,

    /// Where the indicator snapshot is written, if anywhere
    pub indicator_file: Option<PathBuf>,
}

impl From<&AlertConfig> for DesktopPresenterConfig {
    fn from(config: &AlertConfig) -> Self {
        Self {
            app_name: config.app_name.clone(),
            summary: config.summary.clone(),
            icon: config.icon.clone(),
            positive_sound: config.positive_sound.clone(),
            negative_sound: config.negative_sound.clone(),
            indicator_file: config.indicator_file.clone(),
        }
    }
}

/// Latest snapshot waiting to be written, with its generation
#[derive(Debug, Default)]
struct PendingSnapshot {
    generation: u64,
    snapshot: Option<IndicatorSnapshot>,
}

/// Writes indicator snapshots on the blocking pool
///
/// Each write picks up the newest snapshot, so a burst of style changes
/// ends in one write of the final state. Writes are serialized and never
/// go back to an older generation.
struct SnapshotWriter {
    path: PathBuf,
    pending: Arc<Mutex<PendingSnapshot>>,
    written: Arc<Mutex<u64>>,
}

impl SnapshotWriter {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            pending: Arc::new(Mutex::new(PendingSnapshot::default())),
            written: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a snapshot; writes inline when no runtime is running
    fn submit(&self, snapshot: IndicatorSnapshot) {
        {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.generation += 1;
            pending.snapshot = Some(snapshot);
        }

        let path = self.path.clone();
        let pending = Arc::clone(&self.pending);
        let written = Arc::clone(&self.written);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let _ = handle.spawn_blocking(move || Self::write_latest(&path, &pending, &written));
            }
            Err(_) => Self::write_latest(&path, &pending, &written),
        }
    }

    fn write_latest(path: &Path, pending: &Mutex<PendingSnapshot>, written: &Mutex<u64>) {
        let mut written = written.lock().unwrap_or_else(PoisonError::into_inner);

        let (generation, snapshot) = {
            let pending = pending.lock().unwrap_or_else(PoisonError::into_inner);
            (pending.generation, pending.snapshot.clone())
        };
        if generation <= *written {
            return;
        }

        if let Some(snapshot) = snapshot {
            if let Err(e) = snapshot.write_to(path) {
                tracing::warn!("Failed to write indicator state to {:?}: {}", path, e);
            }
        }
        *written = generation;
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        Self::write_latest(&self.path, &self.pending, &self.written);
    }
}

/// Presenter backed by the desktop notification server
pub struct DesktopPresenter {
    config: DesktopPresenterConfig,
    indicator: Indicator,
    last_message: Option<String>,
    writer: Option<SnapshotWriter>,
}

impl DesktopPresenter {
    /// Create a presenter and publish an empty indicator
    pub fn new(config: DesktopPresenterConfig) -> Self {
        let writer = config.indicator_file.clone().map(SnapshotWriter::new);
        let presenter = Self {
            config,
            indicator: Indicator::new(),
            last_message: None,
            writer,
        };
        presenter.publish();
        presenter
    }

    /// Current indicator state
    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Build the notification for an alert
    fn build_notification(&self, alert: &Alert) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(&self.config.app_name)
            .summary(&self.config.summary)
            .body(&alert.message)
            .icon(&self.config.icon);

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let urgency = match alert.urgency {
                Urgency::Normal | Urgency::High => notify_rust::Urgency::Normal,
                Urgency::Critical => notify_rust::Urgency::Critical,
            };
            notification.urgency(urgency);
        }

        // High urgency has no freedesktop counterpart: keep it on screen instead
        if alert.urgency == Urgency::High {
            notification.timeout(Timeout::Never);
        }

        let sound = match alert.sound {
            Some(AlertSound::Positive) => self.config.positive_sound.as_ref(),
            Some(AlertSound::Negative) => self.config.negative_sound.as_ref(),
            None => None,
        };
        if let Some(path) = sound {
            notification.hint(Hint::SoundFile(path.to_string_lossy().into_owned()));
        }

        notification
    }

    /// Display a notification, logging failures
    fn display(notification: Notification) {
        if let Err(e) = notification.show() {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }

    /// Queue the indicator snapshot for writing, if configured
    fn publish(&self) {
        if let Some(writer) = &self.writer {
            writer.submit(self.indicator.snapshot(self.last_message.as_deref()));
        }
    }
}

impl Presenter for DesktopPresenter {
    fn show_alert(&mut self, alert: &Alert) {
        tracing::info!(
            level = %alert.level,
            urgency = ?alert.urgency,
            "Alert: {}",
            truncate_string(&single_line(&alert.message), 120)
        );

        self.last_message = Some(alert.message.clone());
        let notification = self.build_notification(alert);

        // Showing talks to the session bus synchronously; keep it off the event loop
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let _ = handle.spawn_blocking(move || Self::display(notification));
            }
            Err(_) => Self::display(notification),
        }

        self.publish();
    }

    fn apply_style(&mut self, tag: StyleTag) {
        if self.indicator.apply(tag) {
            tracing::trace!("Indicator style on: {}", tag);
            self.publish();
        }
    }

    fn clear_style(&mut self, tag: StyleTag) {
        if self.indicator.clear(tag) {
            tracing::trace!("Indicator style off: {}", tag);
            self.publish();
        }
    }

    fn clear_all_styles(&mut self) {
        if self.indicator.clear_all() {
            tracing::debug!("Indicator cleared");
            self.publish();
        }
    }
}
