//! Adapters - Concrete implementations of the ports.

pub mod location;
pub mod transport;
