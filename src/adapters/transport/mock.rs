//! Scripted transport adapter for tests.
//!
//! `MockConnector` decides per attempt whether the handshake succeeds, and
//! hands out a [`MockTransportHandle`] for every session it creates so tests
//! can inject inbound frames, fail the session, or close it "from the
//! server" and then assert on what the client transmitted.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::ports::{ConnectParams, Transport, TransportConnector, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Succeed,
    Fail,
}

/// Test double for the server side of one transport session.
#[derive(Clone)]
pub struct MockTransportHandle {
    incoming_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Result<String, TransportError>>>>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed_by_client: Arc<AtomicBool>,
}

impl MockTransportHandle {
    /// Queues an inbound frame for the client to receive.
    pub fn push_frame(&self, frame: impl Into<String>) {
        if let Some(tx) = self.incoming_tx.lock().unwrap().as_ref() {
            let _ = tx.send(Ok(frame.into()));
        }
    }

    /// Fails the session with a mid-flight transport error.
    pub fn fail_session(&self) {
        let mut tx = self.incoming_tx.lock().unwrap();
        if let Some(tx) = tx.as_ref() {
            let _ = tx.send(Err(TransportError::Io("injected failure".to_string())));
        }
        *tx = None;
    }

    /// Closes the session as a server-initiated close.
    pub fn close_from_server(&self) {
        *self.incoming_tx.lock().unwrap() = None;
    }

    /// Frames the client transmitted over this session, in order.
    pub fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Whether the client called `close()` on this session.
    pub fn closed_by_client(&self) -> bool {
        self.closed_by_client.load(Ordering::SeqCst)
    }
}

struct MockTransport {
    incoming_rx: mpsc::UnboundedReceiver<Result<String, TransportError>>,
    sent: Arc<Mutex<Vec<String>>>,
    closed_by_client: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        if self.closed_by_client.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.incoming_rx.recv().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed_by_client.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted connector: yields a fresh mock session per successful attempt.
pub struct MockConnector {
    script: Mutex<VecDeque<Outcome>>,
    default_outcome: Outcome,
    handles: Mutex<Vec<MockTransportHandle>>,
    attempts: AtomicU32,
    seen: Mutex<Vec<ConnectParams>>,
}

impl MockConnector {
    /// Every attempt succeeds.
    pub fn new() -> Self {
        Self::with_default(Outcome::Succeed)
    }

    /// Every attempt fails with a handshake error.
    pub fn always_failing() -> Self {
        Self::with_default(Outcome::Fail)
    }

    /// The first `n` attempts fail, then attempts succeed.
    pub fn failing_times(n: usize) -> Self {
        let connector = Self::new();
        connector
            .script
            .lock()
            .unwrap()
            .extend(std::iter::repeat(Outcome::Fail).take(n));
        connector
    }

    fn with_default(default_outcome: Outcome) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_outcome,
            handles: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Number of connection attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Handle for the most recently created session.
    pub fn latest_handle(&self) -> Option<MockTransportHandle> {
        self.handles.lock().unwrap().last().cloned()
    }

    /// Handles for every session created, in order.
    pub fn handles(&self) -> Vec<MockTransportHandle> {
        self.handles.lock().unwrap().clone()
    }

    /// Connect parameters observed, in order.
    pub fn params_seen(&self) -> Vec<ConnectParams> {
        self.seen.lock().unwrap().clone()
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportConnector for MockConnector {
    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn Transport>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_outcome);
        if outcome == Outcome::Fail {
            return Err(TransportError::Handshake("scripted failure".to_string()));
        }

        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let closed_by_client = Arc::new(AtomicBool::new(false));

        let handle = MockTransportHandle {
            incoming_tx: Arc::new(Mutex::new(Some(incoming_tx))),
            sent: Arc::clone(&sent),
            closed_by_client: Arc::clone(&closed_by_client),
        };
        self.handles.lock().unwrap().push(handle);

        Ok(Box::new(MockTransport {
            incoming_rx,
            sent,
            closed_by_client,
        }))
    }
}
