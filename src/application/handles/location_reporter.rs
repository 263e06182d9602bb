//! Periodic location reporter.
//!
//! Reads the device position on a fixed interval and forwards it through
//! the dispatcher. Failures (permission denied, no fix, dispatch while
//! disconnected) are recorded as reactive state and the interval keeps
//! running; there is no backoff and no circuit breaker here on purpose,
//! since the cadence is the product requirement.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::application::dispatcher::ActionDispatcher;
use crate::domain::foundation::{CourierId, Timestamp};
use crate::ports::LocationProvider;

/// Background task forwarding position fixes on a fixed period.
pub struct LocationReporter {
    last_sent_rx: watch::Receiver<Option<Timestamp>>,
    last_error_rx: watch::Receiver<Option<String>>,
    task: JoinHandle<()>,
}

impl LocationReporter {
    /// Starts reporting. Must run inside a tokio runtime. The first read
    /// happens immediately, then every `period`.
    pub fn start(
        dispatcher: ActionDispatcher,
        provider: Arc<dyn LocationProvider>,
        courier_id: CourierId,
        period: Duration,
    ) -> Self {
        let (sent_tx, last_sent_rx) = watch::channel(None);
        let (error_tx, last_error_rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match provider.current_position().await {
                    Ok(reading) => {
                        if dispatcher.send_location(&courier_id, reading) {
                            sent_tx.send_replace(Some(Timestamp::now()));
                            error_tx.send_replace(None);
                        } else {
                            error_tx.send_replace(Some(
                                "location dispatch rejected: not connected".to_string(),
                            ));
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "location read failed");
                        error_tx.send_replace(Some(e.to_string()));
                    }
                }
            }
        });

        Self {
            last_sent_rx,
            last_error_rx,
            task,
        }
    }

    /// Instant of the last successful dispatch, if any.
    pub fn last_sent(&self) -> Option<Timestamp> {
        *self.last_sent_rx.borrow()
    }

    /// Most recent failure, cleared by the next successful dispatch.
    pub fn last_error(&self) -> Option<String> {
        self.last_error_rx.borrow().clone()
    }

    /// Reactive view of the last successful dispatch instant.
    pub fn last_sent_watch(&self) -> watch::Receiver<Option<Timestamp>> {
        self.last_sent_rx.clone()
    }

    /// Reactive view of the most recent failure.
    pub fn last_error_watch(&self) -> watch::Receiver<Option<String>> {
        self.last_error_rx.clone()
    }

    /// Stops the reporting task.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for LocationReporter {
    fn drop(&mut self) {
        self.task.abort();
    }
}
