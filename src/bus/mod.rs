//! Bus Module
//!
//! The notification sink: every status event, whether it comes from another
//! process over D-Bus or from the supervisor, enters the event loop through
//! a [`NotificationSink`].

mod dbus;
mod sink;

pub use dbus::{
    BusEndpointConfig, DbusEndpoint, SinkEndpoint, StatusInterface, StatusProxy,
    DEFAULT_OBJECT_PATH, DEFAULT_SERVICE_NAME, STATUS_INTERFACE,
};
pub use sink::{BridgeEvent, NotificationSink};
