//! Scripted location provider for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::domain::location::LocationReading;
use crate::ports::{LocationError, LocationProvider};

/// Test double returning scripted readings, then repeating the last script
/// entry (or `PermissionDenied` when no script was given).
pub struct MockLocationProvider {
    script: Mutex<VecDeque<Result<LocationReading, LocationError>>>,
    fallback: Mutex<Result<LocationReading, LocationError>>,
    reads: AtomicU32,
}

impl MockLocationProvider {
    /// Provider that always yields the given reading.
    pub fn fixed(reading: LocationReading) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(reading)),
            reads: AtomicU32::new(0),
        }
    }

    /// Provider that always denies permission.
    pub fn denied() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Err(LocationError::PermissionDenied)),
            reads: AtomicU32::new(0),
        }
    }

    /// Queues outcomes to serve before falling back to the terminal one.
    pub fn with_script(
        script: Vec<Result<LocationReading, LocationError>>,
        fallback: Result<LocationReading, LocationError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Mutex::new(fallback),
            reads: AtomicU32::new(0),
        }
    }

    /// Number of reads served so far.
    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for MockLocationProvider {
    async fn current_position(&self) -> Result<LocationReading, LocationError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self.script.lock().unwrap().pop_front() {
            return outcome;
        }
        self.fallback.lock().unwrap().clone()
    }
}
