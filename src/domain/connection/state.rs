//! Connection state machine and disconnect reasons.
//!
//! The connection supervisor is the sole owner of the state; everything else
//! observes it through a watch channel. Transitions:
//!
//! ```text
//! Disconnected --> Connecting --> {Connected | Reconnecting | Failed}
//! Connected    --> Disconnected        (transport loss or explicit close)
//! Disconnected --> Reconnecting        (automatic recovery)
//! Reconnecting --> {Connected | Failed | Disconnected}
//! Failed       --> Connecting          (only via an explicit new connect)
//! ```

use crate::domain::foundation::StateMachine;
use std::fmt;

/// Lifecycle state of the realtime session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport session. Initial state, and the resting state after an
    /// explicit disconnect.
    Disconnected,

    /// First handshake for a `connect` call is in flight.
    Connecting,

    /// Handshake completed; frames flow.
    Connected,

    /// Session was lost and an automatic recovery attempt is pending or in
    /// flight.
    Reconnecting,

    /// The retry cap was exhausted. Terminal until `connect` is called again.
    Failed,
}

impl ConnectionState {
    /// True while a live transport session exists.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    /// True while the supervisor task is running in any form.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Reconnecting
        )
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Disconnected, Reconnecting)
                | (Connecting, Connected)
                | (Connecting, Reconnecting)
                | (Connecting, Failed)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
                | (Reconnecting, Connected)
                | (Reconnecting, Failed)
                | (Reconnecting, Disconnected)
                | (Failed, Connecting)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Disconnected => vec![Connecting, Reconnecting],
            Connecting => vec![Connected, Reconnecting, Failed, Disconnected],
            Connected => vec![Disconnected],
            Reconnecting => vec![Connected, Failed, Disconnected],
            Failed => vec![Connecting],
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Why a transport session ended.
///
/// The string forms mirror the reason codes the platform's previous client
/// stack exposed, so operator logs stay comparable across clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server closed the session on purpose.
    ServerClose,

    /// The transport failed mid-session (read or write error).
    TransportError,

    /// This client requested the close via `disconnect()`.
    ClientClose,
}

impl DisconnectReason {
    /// Whether the supervisor should attempt automatic recovery.
    ///
    /// Server-initiated closes and transport faults are recovered; a close
    /// the client itself asked for is final.
    pub fn should_reconnect(&self) -> bool {
        !matches!(self, DisconnectReason::ClientClose)
    }

    /// Reason code string surfaced in events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::ServerClose => "io server disconnect",
            DisconnectReason::TransportError => "transport error",
            DisconnectReason::ClientClose => "io client disconnect",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_path_is_valid() {
        let s = ConnectionState::Disconnected;
        let s = s.transition_to(ConnectionState::Connecting).unwrap();
        let s = s.transition_to(ConnectionState::Connected).unwrap();
        assert!(s.is_connected());
    }

    #[test]
    fn lost_session_goes_through_disconnected_then_reconnecting() {
        let s = ConnectionState::Connected;
        let s = s.transition_to(ConnectionState::Disconnected).unwrap();
        let s = s.transition_to(ConnectionState::Reconnecting).unwrap();
        assert!(s.is_active());
    }

    #[test]
    fn connected_cannot_jump_to_failed() {
        assert!(ConnectionState::Connected
            .transition_to(ConnectionState::Failed)
            .is_err());
    }

    #[test]
    fn failed_recovers_only_via_explicit_connect() {
        assert_eq!(
            ConnectionState::Failed.valid_transitions(),
            vec![ConnectionState::Connecting]
        );
        assert!(ConnectionState::Failed
            .transition_to(ConnectionState::Reconnecting)
            .is_err());
    }

    #[test]
    fn no_state_is_terminal() {
        for state in [
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
            ConnectionState::Failed,
        ] {
            assert!(!state.is_terminal(), "{:?} should have an exit", state);
        }
    }

    #[test]
    fn server_close_and_transport_error_trigger_reconnect() {
        assert!(DisconnectReason::ServerClose.should_reconnect());
        assert!(DisconnectReason::TransportError.should_reconnect());
        assert!(!DisconnectReason::ClientClose.should_reconnect());
    }

    #[test]
    fn reason_codes_use_stable_strings() {
        assert_eq!(DisconnectReason::ServerClose.as_str(), "io server disconnect");
        assert_eq!(DisconnectReason::ClientClose.as_str(), "io client disconnect");
    }
}
