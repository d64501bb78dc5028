//! Logging System for status-bridge
//!
//! Provides:
//! - Structured logs with configurable verbosity levels
//! - Console and/or rolling file output
//! - Optional JSON formatting for machine parsing

mod config;

#[cfg(test)]
mod tests;

pub use config::{
    default_log_directory, LogFormat, LogLevel, LogOutput, LoggingConfig, RotationConfig,
    RotationStrategy,
};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name prefix
pub const LOG_FILE_NAME: &str = "status-bridge.log";

/// Logging system errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Installed logging system
///
/// Holds the writer guards; dropping it flushes and stops file output.
pub struct LoggingSystem {
    config: LoggingConfig,
    _guards: Vec<WorkerGuard>,
}

impl LoggingSystem {
    /// Initialize the logging system with the given configuration
    pub fn init(config: LoggingConfig) -> LoggingResult<Self> {
        if config.output != LogOutput::Console {
            let log_dir = Self::file_directory(&config);
            std::fs::create_dir_all(&log_dir).map_err(|e| {
                LoggingError::DirectoryCreationError(format!(
                    "Failed to create log directory {:?}: {}",
                    log_dir, e
                ))
            })?;
        }

        let mut guards = Vec::new();
        let env_filter = Self::build_env_filter(&config);
        let registry = tracing_subscriber::registry();

        match config.output {
            LogOutput::Console => {
                registry
                    .with(env_filter)
                    .with(Self::create_console_layer(&config))
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
            LogOutput::File => {
                let (file_layer, guard) = Self::create_file_layer(&config)?;
                guards.push(guard);
                registry
                    .with(env_filter)
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
            LogOutput::Both => {
                let (file_layer, guard) = Self::create_file_layer(&config)?;
                guards.push(guard);
                registry
                    .with(env_filter)
                    .with(Self::create_console_layer(&config))
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
        }

        Ok(Self {
            config,
            _guards: guards,
        })
    }

    /// Build environment filter from configuration
    ///
    /// `RUST_LOG` directives are appended last and win over the file.
    pub(crate) fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
        let mut filter = EnvFilter::new(config.level.as_directive());

        for (module, level) in &config.module_levels {
            match format!("{}={}", module, level.as_directive()).parse::<Directive>() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(e) => eprintln!("Ignoring log directive for {}: {}", module, e),
            }
        }

        if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
            for directive in env.split(',').filter(|d| !d.trim().is_empty()) {
                if let Ok(directive) = directive.trim().parse::<Directive>() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        filter
    }

    fn file_directory(config: &LoggingConfig) -> PathBuf {
        config
            .log_directory
            .clone()
            .unwrap_or_else(default_log_directory)
    }

    /// Create console logging layer
    fn create_console_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_target)
            .with_thread_ids(config.include_thread_id)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info);

        if config.format == LogFormat::Json {
            layer.json().boxed()
        } else {
            layer.boxed()
        }
    }

    /// Create file logging layer with rotation
    fn create_file_layer<S>(
        config: &LoggingConfig,
    ) -> LoggingResult<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let file_appender = Self::file_appender(config, &Self::file_directory(config))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_target(config.include_target)
            .with_thread_ids(config.include_thread_id)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .with_ansi(false);

        if config.format == LogFormat::Json {
            Ok((layer.json().boxed(), guard))
        } else {
            Ok((layer.boxed(), guard))
        }
    }

    pub(crate) fn file_appender(
        config: &LoggingConfig,
        log_dir: &Path,
    ) -> LoggingResult<RollingFileAppender> {
        let rotation = match config.rotation.strategy {
            RotationStrategy::Daily => Rotation::DAILY,
            RotationStrategy::Hourly => Rotation::HOURLY,
            RotationStrategy::Never => Rotation::NEVER,
        };

        RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(LOG_FILE_NAME)
            .max_log_files(config.rotation.max_files.max(1))
            .build(log_dir)
            .map_err(|e| LoggingError::InitializationError(e.to_string()))
    }

    /// Get current log directory, when logging to a file
    pub fn log_directory(&self) -> Option<PathBuf> {
        match self.config.output {
            LogOutput::Console => None,
            LogOutput::File | LogOutput::Both => Some(Self::file_directory(&self.config)),
        }
    }

    /// Get current log level
    pub fn log_level(&self) -> LogLevel {
        self.config.level
    }
}

/// Install a plain console subscriber
///
/// Used when [`LoggingSystem::init`] fails so the daemon still reports.
pub fn init_fallback_logging(level: LogLevel) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_directive()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging with custom configuration
pub fn init_logging(config: LoggingConfig) -> LoggingResult<LoggingSystem> {
    LoggingSystem::init(config)
}
