//! Transport adapters.
//!
//! `TungsteniteConnector` is the production WebSocket implementation;
//! `MockConnector` scripts connection outcomes for deterministic tests.

mod mock;
mod tungstenite;

pub use mock::{MockConnector, MockTransportHandle};
pub use tungstenite::TungsteniteConnector;
