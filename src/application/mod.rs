//! Application layer - the realtime client itself.
//!
//! Wires the domain types, ports, and adapters into the running client:
//! the event bus, the wire protocol, the connection supervisor, the action
//! dispatcher, and the reactive handles consumed by UI code.

pub mod bus;
pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod handles;
pub mod wire;

pub use bus::{EventBus, Subscription};
pub use client::{ClientSettings, RealtimeClient};
pub use dispatcher::ActionDispatcher;
pub use handles::{LocationReporter, NotificationFeedHandle};
