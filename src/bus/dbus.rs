//! D-Bus endpoint of the notification sink
//!
//! Exposes `notify(level, body)` on the session bus. Only this method is
//! public; everything else stays in-process.

use async_trait::async_trait;
use zbus::zvariant::ObjectPath;
use zbus::{connection, fdo, interface, proxy, Connection};

use super::sink::NotificationSink;
use crate::core::error::BusError;

/// Interface name of the status service
pub const STATUS_INTERFACE: &str = "com.alwaysdata.status";

/// Default well-known name of the service
pub const DEFAULT_SERVICE_NAME: &str = "com.alwaysdata.status";

/// Default object path of the service
pub const DEFAULT_OBJECT_PATH: &str = "/com/alwaysdata/status";

/// An endpoint that feeds a [`NotificationSink`]
#[async_trait]
pub trait SinkEndpoint: Send {
    /// Start accepting calls. Calling it twice is harmless.
    async fn enable(&mut self, sink: NotificationSink) -> Result<(), BusError>;

    /// Stop accepting calls. Calling it twice is harmless.
    async fn disable(&mut self) -> Result<(), BusError>;

    /// Whether calls are currently accepted
    fn is_enabled(&self) -> bool;
}

/// Bus coordinates of the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEndpointConfig {
    /// Well-known name requested on the session bus
    pub service_name: String,

    /// Object path the interface is served at
    pub object_path: String,
}

impl Default for BusEndpointConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
        }
    }
}

/// The `com.alwaysdata.status` interface
pub struct StatusInterface {
    sink: NotificationSink,
}

impl StatusInterface {
    pub fn new(sink: NotificationSink) -> Self {
        Self { sink }
    }
}

#[interface(name = "com.alwaysdata.status")]
impl StatusInterface {
    /// Deliver a status notification
    #[zbus(name = "notify")]
    async fn notify(&self, level: String, body: String) -> fdo::Result<()> {
        self.sink.notify(&level, &body).map_err(|e| {
            tracing::warn!("Rejected notification: {}", e);
            fdo::Error::InvalidArgs(e.to_string())
        })
    }
}

/// Client side of the status interface
#[proxy(
    interface = "com.alwaysdata.status",
    default_service = "com.alwaysdata.status",
    default_path = "/com/alwaysdata/status",
    gen_blocking = false
)]
pub trait Status {
    #[zbus(name = "notify")]
    fn notify(&self, level: &str, body: &str) -> zbus::Result<()>;
}

/// Session bus endpoint
pub struct DbusEndpoint {
    config: BusEndpointConfig,
    connection: Option<Connection>,
}

impl DbusEndpoint {
    pub fn new(config: BusEndpointConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Bus coordinates
    pub fn config(&self) -> &BusEndpointConfig {
        &self.config
    }

    fn object_path(&self) -> Result<ObjectPath<'_>, BusError> {
        ObjectPath::try_from(self.config.object_path.as_str()).map_err(|e| {
            BusError::InvalidAddress {
                reason: format!("{}: {}", self.config.object_path, e),
            }
        })
    }
}

#[async_trait]
impl SinkEndpoint for DbusEndpoint {
    async fn enable(&mut self, sink: NotificationSink) -> Result<(), BusError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let path = self.object_path()?.into_owned();
        let connection = connection::Builder::session()?
            .name(self.config.service_name.as_str())?
            .serve_at(path, StatusInterface::new(sink))?
            .build()
            .await?;

        tracing::info!(
            "Status interface exported as {} at {}",
            self.config.service_name,
            self.config.object_path
        );
        self.connection = Some(connection);
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), BusError> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };

        let path = self.object_path()?.into_owned();
        connection
            .object_server()
            .remove::<StatusInterface, _>(path)
            .await?;
        connection
            .release_name(self.config.service_name.as_str())
            .await?;

        tracing::info!("Status interface unexported");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.connection.is_some()
    }
}
