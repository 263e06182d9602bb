//! The realtime client root object.
//!
//! A `RealtimeClient` is an explicitly constructed, dependency-injected
//! value: the embedding application builds one at startup (with the real
//! WebSocket connector) and passes it down; tests build as many as they
//! want with mock connectors. Nothing in this crate is a process-wide
//! singleton.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::application::bus::{EventBus, Subscription};
use crate::application::connection::{advance, run_supervisor, SupervisorSettings};
use crate::application::dispatcher::ActionDispatcher;
use crate::application::wire::ClientFrame;
use crate::config::AppConfig;
use crate::domain::connection::ConnectionState;
use crate::domain::events::{ClientEvent, EventKind};
use crate::domain::foundation::ClientIdentity;
use crate::ports::{ConnectParams, Role, TransportConnector};

/// Client tuning, resolved from configuration.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Consecutive failed connection attempts before giving up.
    pub max_retries: u32,

    /// Base delay for the linear backoff (`base * attempt`).
    pub retry_base_delay: Duration,

    /// Keep-alive cadence while connected.
    pub heartbeat_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_base_delay: Duration::from_secs(2),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl From<&AppConfig> for ClientSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_retries: config.retry.max_attempts,
            retry_base_delay: Duration::from_millis(config.retry.base_delay_ms),
            heartbeat_interval: Duration::from_secs(config.heartbeat.interval_secs),
        }
    }
}

struct SessionHandle {
    shutdown_tx: oneshot::Sender<()>,
    _task: JoinHandle<()>,
}

/// Realtime session owner: connection lifecycle, event bus, dispatcher.
pub struct RealtimeClient {
    settings: ClientSettings,
    connector: Arc<dyn TransportConnector>,
    bus: EventBus,
    cmd_tx: mpsc::UnboundedSender<ClientFrame>,
    cmd_rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ClientFrame>>>,
    state_tx: watch::Sender<ConnectionState>,
    error_tx: watch::Sender<Option<String>>,
    session: Mutex<Option<SessionHandle>>,
}

impl RealtimeClient {
    /// Builds a client around a transport connector. No I/O happens until
    /// [`connect`](Self::connect).
    pub fn new(settings: ClientSettings, connector: Arc<dyn TransportConnector>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (error_tx, _) = watch::channel(None);

        Self {
            settings,
            connector,
            bus: EventBus::new(),
            cmd_tx,
            cmd_rx: Arc::new(tokio::sync::Mutex::new(cmd_rx)),
            state_tx,
            error_tx,
            session: Mutex::new(None),
        }
    }

    /// Starts a session for `identity`/`role`.
    ///
    /// A call while a session is live (connecting, connected, or
    /// reconnecting) is a no-op. A call after `Failed` starts over with a
    /// fresh retry budget. Must run inside a tokio runtime.
    pub fn connect(&self, identity: ClientIdentity, role: Role) {
        let mut session = self.session.lock().expect("RealtimeClient: session poisoned");
        if self.state_tx.borrow().is_active() {
            tracing::debug!("connect called while session is active; ignoring");
            return;
        }
        // A previous supervisor, if any, has already exited; dropping its
        // handle just releases the finished task.
        let _ = session.take();

        advance(&self.state_tx, ConnectionState::Connecting);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let params = ConnectParams { identity, role };
        let task = tokio::spawn(run_supervisor(
            params,
            Arc::clone(&self.connector),
            self.bus.clone(),
            self.state_tx.clone(),
            self.error_tx.clone(),
            Arc::clone(&self.cmd_rx),
            shutdown_rx,
            SupervisorSettings {
                max_retries: self.settings.max_retries,
                retry_base_delay: self.settings.retry_base_delay,
                heartbeat_interval: self.settings.heartbeat_interval,
            },
        ));

        *session = Some(SessionHandle {
            shutdown_tx,
            _task: task,
        });
    }

    /// Tears down the session and clears every bus subscription.
    ///
    /// No reconnection is attempted after an explicit disconnect.
    pub fn disconnect(&self) {
        let mut session = self.session.lock().expect("RealtimeClient: session poisoned");
        if let Some(handle) = session.take() {
            let _ = handle.shutdown_tx.send(());
        }
        // Reflect the teardown immediately; the supervisor confirms it when
        // it processes the shutdown signal.
        if self.state_tx.borrow().is_active() {
            advance(&self.state_tx, ConnectionState::Disconnected);
        }
        self.bus.clear();
    }

    /// Registers a callback for one event kind.
    pub fn on(
        &self,
        kind: EventKind,
        callback: impl Fn(&ClientEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on(kind, callback)
    }

    /// The shared event bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Dispatcher handle for domain actions.
    pub fn dispatcher(&self) -> ActionDispatcher {
        ActionDispatcher::new(self.cmd_tx.clone(), self.state_tx.subscribe())
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Reactive view of the connection state.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// True while a live session exists.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Most recent connection error, if any. Cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.error_tx.borrow().clone()
    }

    /// Reactive view of the connection error.
    pub fn error_watch(&self) -> watch::Receiver<Option<String>> {
        self.error_tx.subscribe()
    }
}
