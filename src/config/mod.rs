//! Configuration Management Module for status-bridge
//!
//! Provides persistent configuration storage with:
//! - JSON file-based storage
//! - Defaults for every missing field
//! - Thread-safe access

mod storage;

pub use storage::{
    AlertConfig, AppConfig, BlinkSettings, BusConfig, ConfigError, ConfigResult, ConfigStore,
    ConfigStoreConfig, DaemonConfig,
};
