//! status-bridge daemon
//!
//! Usage:
//!   status-bridge [--config <path>] [--command <cmd>] [--verbose]
//!
//! Exports the status interface on the session bus, supervises the daemon
//! and drives the desktop indicator until SIGINT or SIGTERM. SIGUSR1
//! acknowledges the indicator.

use std::path::PathBuf;

use anyhow::Context;

use status_bridge::bus::{DbusEndpoint, NotificationSink};
use status_bridge::config::{AppConfig, ConfigStore, ConfigStoreConfig};
use status_bridge::controller::Controller;
use status_bridge::logging::{self, LogLevel, LoggingSystem};
use status_bridge::presentation::DesktopPresenter;
use status_bridge::supervisor::TokioLauncher;

/// Command line arguments
struct Args {
    /// Configuration file, instead of the per-user default
    config: Option<PathBuf>,
    /// Daemon command line, overriding the configuration
    command: Option<String>,
    /// Enable verbose logging
    verbose: bool,
}

impl Args {
    fn parse() -> Result<Self, String> {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut command = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = Some(args.next().map(PathBuf::from).ok_or("--config needs a path")?);
                }
                "--command" | "-x" => {
                    command = Some(args.next().ok_or("--command needs a command line")?);
                }
                "--verbose" | "-v" => {
                    verbose = true;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("Unknown argument: {}", arg));
                }
            }
        }

        Ok(Self {
            config,
            command,
            verbose,
        })
    }

    /// Apply overrides in memory; the file is left alone
    fn apply(&self, config: &mut AppConfig) {
        if let Some(command) = &self.command {
            config.daemon.command = Some(command.clone());
        }
        if self.verbose {
            config.logging.level = LogLevel::Debug;
        }
    }
}

fn print_help() {
    println!(
        r#"status-bridge - Desktop status bridge

USAGE:
    status-bridge [OPTIONS]

OPTIONS:
    -c, --config <PATH>       Configuration file (default: ~/.config/status-bridge/config.json)
    -x, --command <CMD>       Daemon command line, overrides daemon.command
    -v, --verbose             Enable verbose logging
    -h, --help                Print this help message

DESCRIPTION:
    Exports com.alwaysdata.status on the session bus. Every notify(level, body)
    call raises a desktop notification and drives the indicator: warn and
    above blink and stay lit, critical and error are counted until as many
    success messages resolve them.

    The daemon is restarted after a crash, up to daemon.max_abnormal_stops
    times. Send SIGUSR1 to acknowledge and clear the indicator.
"#
    );
}

fn init_logging(config: &AppConfig) -> Option<LoggingSystem> {
    match LoggingSystem::init(config.logging.clone()) {
        Ok(system) => Some(system),
        Err(e) => {
            eprintln!("Failed to initialize logging system: {}. Using basic logging.", e);
            logging::init_fallback_logging(config.logging.level);
            None
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(unix)]
fn listen_for_acknowledge(sink: NotificationSink) {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::user_defined1()) {
        Ok(mut acknowledge) => {
            tokio::spawn(async move {
                while acknowledge.recv().await.is_some() {
                    tracing::debug!("SIGUSR1 received");
                    sink.acknowledge();
                }
            });
        }
        Err(e) => tracing::warn!("Cannot listen for SIGUSR1: {}", e),
    }
}

#[cfg(not(unix))]
fn listen_for_acknowledge(_sink: NotificationSink) {}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => ConfigStoreConfig::at(path),
        None => ConfigStoreConfig::default(),
    };
    let store = ConfigStore::new(settings)
        .await
        .context("Failed to load configuration")?;

    let mut config = store.get().await;
    args.apply(&mut config);
    config.validate().context("Invalid command line override")?;

    let logging_system = init_logging(&config);
    tracing::info!("Starting status-bridge, configuration {:?}", store.config_path());
    if store.was_created() {
        tracing::info!("Created default configuration at {:?}", store.config_path());
    }
    if let Some(system) = &logging_system {
        match system.log_directory() {
            Some(dir) => tracing::info!("Logging at {} level, files in {:?}", system.log_level(), dir),
            None => tracing::info!("Logging at {} level to the console", system.log_level()),
        }
    }

    let presenter = DesktopPresenter::new((&config.alerts).into());
    let (launcher, exits) = TokioLauncher::new();
    let endpoint = DbusEndpoint::new((&config.bus).into());

    let mut controller = Controller::init(&config, presenter, launcher, endpoint, exits);
    controller
        .enable()
        .await
        .context("Failed to export the status interface")?;

    listen_for_acknowledge(controller.sink());
    controller.run(shutdown_signal()).await;

    if let Err(e) = controller.disable().await {
        tracing::warn!("Failed to release the status interface: {}", e);
    }
    tracing::info!("status-bridge stopped");

    Ok(())
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start the runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args)) {
        tracing::error!("status-bridge failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
