//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the client core and the outside world. Adapters implement these ports.
//!
//! ## Transport Ports
//!
//! - `Transport` - An established framed session to the gateway
//! - `TransportConnector` - Factory for transport sessions
//!
//! ## Device Ports
//!
//! - `LocationProvider` - Source of device position readings

mod location_provider;
mod transport;

pub use location_provider::{LocationError, LocationProvider};
pub use transport::{ConnectParams, Role, Transport, TransportConnector, TransportError};
