//! Transport port - Interface for the framed gateway session.
//!
//! The connection supervisor drives these traits and never sees the
//! underlying socket library. The real adapter speaks WebSocket; tests use
//! the scripted mock adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::ClientIdentity;

/// Errors produced by transport sessions and connectors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The handshake with the gateway did not complete.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The session failed mid-flight.
    #[error("transport error: {0}")]
    Io(String),

    /// The session is closed; no further frames can be exchanged.
    #[error("connection closed")]
    Closed,
}

/// Role tag carried in the connection handshake.
///
/// Determines which rooms and event streams the gateway attaches the
/// session to. The courier role keeps its legacy wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(rename = "motoboy")]
    Courier,
    Store,
    Support,
    Admin,
    Customer,
}

impl Role {
    /// Wire form of the role tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Courier => "motoboy",
            Role::Store => "store",
            Role::Support => "support",
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motoboy" | "courier" => Ok(Role::Courier),
            "store" => Ok(Role::Store),
            "support" => Ok(Role::Support),
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Parameters identifying the connecting party during the handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectParams {
    pub identity: ClientIdentity,
    pub role: Role,
}

/// An established, framed session to the gateway.
///
/// Frames are UTF-8 text (JSON on the wire). Implementations are owned by a
/// single task at a time, so methods take `&mut self` and the trait only
/// requires `Send`.
#[async_trait]
pub trait Transport: Send {
    /// Sends one frame. Fails when the session is no longer usable.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Receives the next frame.
    ///
    /// Returns `None` when the peer closed the session cleanly, and
    /// `Some(Err(_))` when the session failed mid-flight.
    async fn recv(&mut self) -> Option<Result<String, TransportError>>;

    /// Closes the session. Safe to call more than once.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Factory for transport sessions.
///
/// Each successful call yields a fresh session; the supervisor calls it
/// again for every reconnection attempt.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Transport>, TransportError>;
}
