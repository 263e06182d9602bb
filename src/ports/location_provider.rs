//! LocationProvider port - Interface for device position readings.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::location::LocationReading;

/// Errors a position source can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The user denied the location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// No position is currently available.
    #[error("location unavailable: {0}")]
    Unavailable(String),

    /// The position read did not complete in time.
    #[error("location read timed out")]
    Timeout,
}

/// Port for reading the device's current position.
///
/// Implementations should return quickly; the location reporter polls on a
/// fixed interval and records, but does not back off on, repeated failures.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Reads the current position in whichever shape the source produces.
    async fn current_position(&self) -> Result<LocationReading, LocationError>;
}
