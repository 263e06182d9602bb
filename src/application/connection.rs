//! Connection supervisor.
//!
//! One task owns the transport session end to end: it performs the
//! handshake, pumps outbound frames, dispatches inbound frames onto the
//! event bus, sends heartbeats, and recovers lost sessions with linear
//! backoff up to the retry cap. State is published through a watch channel;
//! lifecycle events go out on the bus.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

use crate::application::bus::EventBus;
use crate::application::wire::{ClientFrame, ServerFrame};
use crate::domain::connection::{ConnectionState, DisconnectReason, RetryCounter};
use crate::domain::events::ClientEvent;
use crate::domain::foundation::StateMachine;
use crate::ports::{ConnectParams, Transport, TransportConnector, TransportError};

/// Tuning knobs the supervisor runs with, resolved from configuration.
#[derive(Debug, Clone)]
pub(crate) struct SupervisorSettings {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub heartbeat_interval: Duration,
}

/// Moves the published state along a validated transition.
///
/// An invalid transition is a supervisor bug; it is logged and ignored
/// rather than poisoning the session.
pub(crate) fn advance(state_tx: &watch::Sender<ConnectionState>, target: ConnectionState) {
    let current = *state_tx.borrow();
    if current == target {
        return;
    }
    match current.transition_to(target) {
        Ok(next) => {
            state_tx.send_replace(next);
        }
        Err(e) => tracing::warn!(error = %e, "ignoring invalid connection state transition"),
    }
}

/// Runs one `connect` call to completion: until an explicit disconnect, the
/// client is dropped, or the retry cap is exhausted.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn run_supervisor(
    params: ConnectParams,
    connector: Arc<dyn TransportConnector>,
    bus: EventBus,
    state_tx: watch::Sender<ConnectionState>,
    error_tx: watch::Sender<Option<String>>,
    cmd_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ClientFrame>>>,
    mut shutdown_rx: oneshot::Receiver<()>,
    settings: SupervisorSettings,
) {
    // The command channel is created once per client; holding the guard for
    // the supervisor's lifetime enforces the one-active-session invariant.
    let mut cmd_rx = cmd_rx.lock_owned().await;
    // A predecessor supervisor may have stomped the state while finishing
    // its own teardown; reassert Connecting now that the session is ours.
    advance(&state_tx, ConnectionState::Connecting);
    let mut retry = RetryCounter::new(settings.max_retries);
    let mut had_session = false;

    loop {
        let attempt = tokio::select! {
            _ = &mut shutdown_rx => {
                advance(&state_tx, ConnectionState::Disconnected);
                return;
            }
            result = connector.connect(&params) => result,
        };

        let mut transport = match attempt {
            Ok(transport) => transport,
            Err(e) => {
                let attempts = retry.record_failure();
                error_tx.send_replace(Some(e.to_string()));

                if retry.exhausted() {
                    tracing::error!(attempts, error = %e, "connection attempts exhausted");
                    advance(&state_tx, ConnectionState::Failed);
                    bus.emit(&ClientEvent::ConnectionFailed { attempts });
                    return;
                }

                let delay = retry.delay(settings.retry_base_delay);
                tracing::warn!(
                    attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "connection attempt failed, backing off"
                );
                advance(&state_tx, ConnectionState::Reconnecting);
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        advance(&state_tx, ConnectionState::Disconnected);
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                continue;
            }
        };

        let restored = had_session;
        had_session = true;
        retry.reset();
        error_tx.send_replace(None);
        drain_stale(&mut cmd_rx);

        advance(&state_tx, ConnectionState::Connected);
        tracing::info!(restored, "realtime session established");
        bus.emit(&ClientEvent::ConnectionSuccess);
        if restored {
            bus.emit(&ClientEvent::ConnectionRestored);
        }

        let reason = drive_session(
            transport.as_mut(),
            &mut cmd_rx,
            &bus,
            settings.heartbeat_interval,
            &mut shutdown_rx,
        )
        .await;
        let _ = transport.close().await;

        advance(&state_tx, ConnectionState::Disconnected);
        if reason == DisconnectReason::TransportError {
            error_tx.send_replace(Some(reason.as_str().to_string()));
        }
        bus.emit(&ClientEvent::ConnectionLost { reason });
        drain_stale(&mut cmd_rx);

        if !reason.should_reconnect() {
            return;
        }
        tracing::info!(
            reason = reason.as_str(),
            "session lost, attempting automatic reconnection"
        );
        advance(&state_tx, ConnectionState::Reconnecting);
    }
}

/// Pumps one established session until it ends, returning why it ended.
async fn drive_session(
    transport: &mut dyn Transport,
    cmd_rx: &mut mpsc::UnboundedReceiver<ClientFrame>,
    bus: &EventBus,
    heartbeat_interval: Duration,
    shutdown_rx: &mut oneshot::Receiver<()>,
) -> DisconnectReason {
    let mut heartbeat = tokio::time::interval(heartbeat_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately; consume it
    // so heartbeats start one period after the handshake.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => return DisconnectReason::ClientClose,

            _ = heartbeat.tick() => {
                if let Err(e) = send_frame(transport, &ClientFrame::Heartbeat).await {
                    tracing::warn!(error = %e, "heartbeat send failed");
                    return DisconnectReason::TransportError;
                }
            }

            cmd = cmd_rx.recv() => match cmd {
                Some(frame) => {
                    if let Err(e) = send_frame(transport, &frame).await {
                        tracing::warn!(error = %e, "outbound send failed");
                        return DisconnectReason::TransportError;
                    }
                }
                // The command channel outlives every session; None means the
                // client value itself is gone.
                None => return DisconnectReason::ClientClose,
            },

            inbound = transport.recv() => match inbound {
                Some(Ok(raw)) => dispatch_frame(&raw, bus),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "transport receive error");
                    return DisconnectReason::TransportError;
                }
                None => return DisconnectReason::ServerClose,
            },
        }
    }
}

/// Parses an inbound frame and emits it on the bus. Frames that do not
/// match the gateway contract are logged and skipped, never fatal.
fn dispatch_frame(raw: &str, bus: &EventBus) {
    match serde_json::from_str::<ServerFrame>(raw) {
        Ok(frame) => bus.emit(&frame.into_event()),
        Err(e) => tracing::warn!(error = %e, raw, "ignoring unrecognized frame"),
    }
}

async fn send_frame(
    transport: &mut dyn Transport,
    frame: &ClientFrame,
) -> Result<(), TransportError> {
    match serde_json::to_string(frame) {
        Ok(json) => transport.send(json).await,
        Err(e) => {
            // A frame that cannot serialize is a programming error; drop it
            // rather than killing the session.
            tracing::error!(error = %e, "failed to serialize outbound frame");
            Ok(())
        }
    }
}

/// Drops frames queued while no session was live; actions are
/// fire-and-forget and must not be replayed after a reconnect.
fn drain_stale(cmd_rx: &mut mpsc::UnboundedReceiver<ClientFrame>) {
    while let Ok(frame) = cmd_rx.try_recv() {
        tracing::debug!(?frame, "dropping frame queued while disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::EventKind;
    use std::sync::Mutex;

    #[test]
    fn dispatch_frame_emits_known_events() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = Arc::clone(&seen);
        let _sub = bus.on(EventKind::HeartbeatResponse, move |_| {
            *seen_clone.lock().unwrap() += 1;
        });

        dispatch_frame(r#"{"event":"heartbeat:response"}"#, &bus);
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn dispatch_frame_skips_unknown_frames() {
        let bus = EventBus::new();
        // Must not panic or emit anything.
        dispatch_frame(r#"{"event":"mystery"}"#, &bus);
        dispatch_frame("not even json", &bus);
    }

    #[test]
    fn advance_rejects_invalid_transitions() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connected);

        advance(&state_tx, ConnectionState::Failed);
        assert_eq!(*state_rx.borrow(), ConnectionState::Connected);

        advance(&state_tx, ConnectionState::Disconnected);
        assert_eq!(*state_rx.borrow(), ConnectionState::Disconnected);
    }

    #[test]
    fn advance_is_idempotent_for_the_same_state() {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        advance(&state_tx, ConnectionState::Disconnected);
        assert_eq!(*state_rx.borrow(), ConnectionState::Disconnected);
    }
}
