//! Configuration Storage Implementation
//!
//! Provides JSON file-based configuration storage with:
//! - Atomic writes using temp file + rename
//! - Validation before anything is persisted
//! - Thread-safe access via RwLock
//! - Default configuration generation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::bus::{BusEndpointConfig, DEFAULT_OBJECT_PATH, DEFAULT_SERVICE_NAME};
use crate::logging::LoggingConfig;
use crate::severity::{BlinkConfig, DEFAULT_BLINK_DURATION_MS, DEFAULT_BLINK_FREQUENCY_HZ};
use crate::supervisor::{SupervisorConfig, DEFAULT_MAX_ABNORMAL_STOPS};

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration store settings
#[derive(Debug, Clone)]
pub struct ConfigStoreConfig {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Whether to create default config if not exists
    pub create_default: bool,
}

impl Default for ConfigStoreConfig {
    fn default() -> Self {
        let app_data = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("status-bridge");

        Self {
            config_path: app_data.join("config.json"),
            create_default: true,
        }
    }
}

impl ConfigStoreConfig {
    /// Settings for an explicit configuration file
    pub fn at(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            create_default: true,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Watched daemon
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Blink cycle
    #[serde(default)]
    pub blink: BlinkSettings,

    /// Session bus endpoint
    #[serde(default)]
    pub bus: BusConfig,

    /// Desktop alerts and indicator
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Last modified timestamp
    #[serde(default = "default_timestamp")]
    pub last_modified: String,
}

fn default_version() -> u32 {
    1
}

fn default_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            daemon: DaemonConfig::default(),
            blink: BlinkSettings::default(),
            bus: BusConfig::default(),
            alerts: AlertConfig::default(),
            logging: LoggingConfig::default(),
            last_modified: default_timestamp(),
        }
    }
}

impl AppConfig {
    /// Check the values the core cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.blink.frequency_hz == 0 {
            return Err(ConfigError::Invalid(
                "blink.frequency_hz must be greater than zero".to_string(),
            ));
        }
        if self.blink.duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "blink.duration_ms must be greater than zero".to_string(),
            ));
        }
        if self.daemon.max_abnormal_stops == 0 {
            return Err(ConfigError::Invalid(
                "daemon.max_abnormal_stops must be greater than zero".to_string(),
            ));
        }
        if let Some(command) = &self.daemon.command {
            if command.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "daemon.command must not be empty".to_string(),
                ));
            }
        }
        if self.bus.service_name.trim().is_empty() || !self.bus.object_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "invalid bus address {:?} at {:?}",
                self.bus.service_name, self.bus.object_path
            )));
        }
        Ok(())
    }
}

/// Watched daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Command line; no supervision when unset
    #[serde(default)]
    pub command: Option<String>,

    /// Abnormal stops tolerated before supervision pauses
    #[serde(default = "default_max_abnormal_stops")]
    pub max_abnormal_stops: u32,
}

fn default_max_abnormal_stops() -> u32 {
    DEFAULT_MAX_ABNORMAL_STOPS
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            command: None,
            max_abnormal_stops: default_max_abnormal_stops(),
        }
    }
}

impl DaemonConfig {
    /// Supervisor settings, if a command is configured
    pub fn supervisor_config(&self) -> Option<SupervisorConfig> {
        self.command.as_ref().map(|command| SupervisorConfig {
            command: command.clone(),
            max_abnormal_stops: self.max_abnormal_stops,
        })
    }
}

/// Blink cycle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkSettings {
    /// Total blink duration in milliseconds
    #[serde(default = "default_blink_duration")]
    pub duration_ms: u64,

    /// On/off pairs per second
    #[serde(default = "default_blink_frequency")]
    pub frequency_hz: u32,
}

fn default_blink_duration() -> u64 {
    DEFAULT_BLINK_DURATION_MS
}

fn default_blink_frequency() -> u32 {
    DEFAULT_BLINK_FREQUENCY_HZ
}

impl Default for BlinkSettings {
    fn default() -> Self {
        Self {
            duration_ms: default_blink_duration(),
            frequency_hz: default_blink_frequency(),
        }
    }
}

impl From<BlinkSettings> for BlinkConfig {
    fn from(settings: BlinkSettings) -> Self {
        BlinkConfig {
            duration: Duration::from_millis(settings.duration_ms),
            frequency_hz: settings.frequency_hz,
        }
    }
}

/// Session bus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Well-known name requested on the session bus
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Object path of the status interface
    #[serde(default = "default_object_path")]
    pub object_path: String,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

fn default_object_path() -> String {
    DEFAULT_OBJECT_PATH.to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            object_path: default_object_path(),
        }
    }
}

impl From<&BusConfig> for BusEndpointConfig {
    fn from(config: &BusConfig) -> Self {
        BusEndpointConfig {
            service_name: config.service_name.clone(),
            object_path: config.object_path.clone(),
        }
    }
}

/// Desktop alert configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Application name reported to the notification server
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Summary line of every notification
    #[serde(default = "default_summary")]
    pub summary: String,

    /// Icon name
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Sound played with positive alerts
    #[serde(default = "default_positive_sound")]
    pub positive_sound: Option<PathBuf>,

    /// Sound played with negative alerts
    #[serde(default = "default_negative_sound")]
    pub negative_sound: Option<PathBuf>,

    /// Indicator state file read by the status bar
    #[serde(default = "default_indicator_file")]
    pub indicator_file: Option<PathBuf>,
}

fn default_app_name() -> String {
    "status-bridge".to_string()
}

fn default_summary() -> String {
    "alwaysdata".to_string()
}

fn default_icon() -> String {
    "network-server".to_string()
}

fn default_positive_sound() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/share/sounds/KDE-Sys-App-Positive.ogg"))
}

fn default_negative_sound() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/share/sounds/KDE-Sys-App-Negative.ogg"))
}

fn default_indicator_file() -> Option<PathBuf> {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("status-bridge").join("indicator.json"))
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            summary: default_summary(),
            icon: default_icon(),
            positive_sound: default_positive_sound(),
            negative_sound: default_negative_sound(),
            indicator_file: default_indicator_file(),
        }
    }
}

/// Configuration store with thread-safe access
pub struct ConfigStore {
    config: Arc<RwLock<AppConfig>>,
    settings: ConfigStoreConfig,
    created: bool,
}

impl ConfigStore {
    /// Create a new configuration store
    pub async fn new(settings: ConfigStoreConfig) -> ConfigResult<Self> {
        let created = !settings.config_path.exists() && settings.create_default;
        let config = if settings.config_path.exists() {
            Self::load_from_file(&settings.config_path).await?
        } else if settings.create_default {
            if let Some(parent) = settings.config_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let default_config = AppConfig::default();
            Self::save_to_file(&settings.config_path, &default_config).await?;
            default_config
        } else {
            return Err(ConfigError::NotFound(settings.config_path.clone()));
        };

        config.validate()?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            settings,
            created,
        })
    }

    /// Load configuration from file
    async fn load_from_file(path: &Path) -> ConfigResult<AppConfig> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file with atomic write
    async fn save_to_file(path: &Path, config: &AppConfig) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(config)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &content).await?;
        tokio::fs::rename(&temp_path, path).await?;

        Ok(())
    }

    /// Get current configuration (read-only)
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Update configuration
    ///
    /// The change is validated first; an invalid result leaves both the
    /// stored and the persisted configuration untouched.
    pub async fn update<F>(&self, updater: F) -> ConfigResult<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().await;

        let mut updated = config.clone();
        updater(&mut updated);
        updated.validate()?;
        updated.last_modified = chrono::Utc::now().to_rfc3339();

        Self::save_to_file(&self.settings.config_path, &updated).await?;
        *config = updated;

        Ok(config.clone())
    }

    /// Set entire configuration
    pub async fn set(&self, new_config: AppConfig) -> ConfigResult<()> {
        self.update(|config| *config = new_config).await.map(|_| ())
    }

    /// Reset to default configuration
    pub async fn reset(&self) -> ConfigResult<AppConfig> {
        let default_config = AppConfig::default();
        self.set(default_config).await?;
        Ok(self.get().await)
    }

    /// Get configuration file path
    pub fn config_path(&self) -> &Path {
        &self.settings.config_path
    }

    /// Whether this store wrote a default configuration file on open
    pub fn was_created(&self) -> bool {
        self.created
    }
}

// Convenience methods for specific config sections
impl ConfigStore {
    /// Set or clear the watched daemon command
    pub async fn set_daemon_command(&self, command: Option<String>) -> ConfigResult<AppConfig> {
        self.update(|config| {
            config.daemon.command = command;
        })
        .await
    }

    /// Update blink settings
    pub async fn set_blink(&self, blink: BlinkSettings) -> ConfigResult<AppConfig> {
        self.update(|config| {
            config.blink = blink;
        })
        .await
    }
}
