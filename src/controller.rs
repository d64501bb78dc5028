//! Bridge controller
//!
//! Owns the aggregator, the supervisor and the bus endpoint, and runs the
//! single cooperative event loop that mutates them:
//! - sink events (bus calls, supervisor notifications, acknowledgements)
//! - child exits reported by the launcher
//! - the aggregator's scheduled blink wakeup

use std::future::Future;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::bus::{BridgeEvent, NotificationSink, SinkEndpoint};
use crate::config::AppConfig;
use crate::core::error::BusError;
use crate::core::types::SeverityLevel;
use crate::presentation::Presenter;
use crate::severity::Aggregator;
use crate::supervisor::{ChildExit, Launcher, Supervisor, TerminationOutcome};

/// The running bridge
pub struct Controller<P, L, E> {
    aggregator: Aggregator<P>,
    supervisor: Option<Supervisor<L>>,
    endpoint: E,
    sink: NotificationSink,
    events: mpsc::UnboundedReceiver<BridgeEvent>,
    exits: mpsc::UnboundedReceiver<ChildExit>,
}

impl<P, L, E> Controller<P, L, E>
where
    P: Presenter,
    L: Launcher,
    E: SinkEndpoint,
{
    /// Wire the components together. Nothing is started yet.
    ///
    /// Without a configured daemon command the launcher is dropped and no
    /// supervision happens.
    pub fn init(
        config: &AppConfig,
        presenter: P,
        launcher: L,
        endpoint: E,
        exits: mpsc::UnboundedReceiver<ChildExit>,
    ) -> Self {
        let (sink, events) = NotificationSink::channel();
        let aggregator = Aggregator::new(presenter, config.blink.into());

        let supervisor = match config.daemon.supervisor_config() {
            Some(supervisor_config) => Some(Supervisor::new(supervisor_config, launcher, sink.clone())),
            None => {
                tracing::info!("No daemon command configured, supervision disabled");
                None
            }
        };

        Self {
            aggregator,
            supervisor,
            endpoint,
            sink,
            events,
            exits,
        }
    }

    /// A sink feeding this controller
    pub fn sink(&self) -> NotificationSink {
        self.sink.clone()
    }

    pub fn aggregator(&self) -> &Aggregator<P> {
        &self.aggregator
    }

    pub fn supervisor(&self) -> Option<&Supervisor<L>> {
        self.supervisor.as_ref()
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Start accepting notifications, then start the daemon
    ///
    /// A daemon that fails to launch is reported as an `error` notification;
    /// only an endpoint failure is returned.
    pub async fn enable(&mut self) -> Result<(), BusError> {
        self.endpoint.enable(self.sink.clone()).await?;

        if let Some(supervisor) = &mut self.supervisor {
            if let Err(e) = supervisor.start(false) {
                self.sink
                    .submit(SeverityLevel::Error, format!("Failed to start daemon: {}", e));
            }
        }

        tracing::info!("Bridge enabled");
        Ok(())
    }

    /// Process events until `shutdown` completes
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let wakeup = self.aggregator.next_wakeup();

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                Some(event) = self.events.recv() => {
                    self.handle_event(event, Instant::now());
                }
                Some(exit) = self.exits.recv() => {
                    self.handle_exit(exit);
                }
                _ = sleep_until(wakeup) => {
                    self.handle_wakeup(Instant::now());
                }
            }
        }
    }

    /// Stop the daemon, clear the indicator, then stop accepting notifications
    ///
    /// Safe to call more than once.
    pub async fn disable(&mut self) -> Result<(), BusError> {
        if let Some(supervisor) = &mut self.supervisor {
            supervisor.stop();
        }

        self.aggregator.reset();
        self.endpoint.disable().await?;

        tracing::info!("Bridge disabled");
        Ok(())
    }

    /// Apply one sink event
    pub fn handle_event(&mut self, event: BridgeEvent, now: Instant) {
        match event {
            BridgeEvent::Notify { level, body } => self.aggregator.record(level, &body, now),
            BridgeEvent::Acknowledge => {
                tracing::info!("Indicator acknowledged");
                self.aggregator.reset();
            }
        }
    }

    /// Apply one child exit
    pub fn handle_exit(&mut self, exit: ChildExit) {
        let Some(supervisor) = &mut self.supervisor else {
            tracing::debug!("Exit of pid {} without supervision", exit.pid);
            return;
        };

        match supervisor.on_termination(exit) {
            Ok(TerminationOutcome::Restarted) => tracing::info!("Daemon restarted"),
            Ok(_) => {}
            Err(e) => tracing::warn!("Daemon supervision: {}", e),
        }
    }

    /// Run the blink phase due at `now`
    pub fn handle_wakeup(&mut self, now: Instant) {
        self.aggregator.on_wakeup(now);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
