//! Channel-fed location provider.
//!
//! The crate has no direct access to device sensors; the embedding
//! application (mobile shell, desktop agent) owns the platform geolocation
//! API and pushes each reading into a [`LocationSink`]. The provider serves
//! the most recent reading to the location reporter.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::location::LocationReading;
use crate::ports::{LocationError, LocationProvider};

/// Write side: the embedding application pushes readings here.
#[derive(Clone)]
pub struct LocationSink {
    tx: watch::Sender<Option<LocationReading>>,
}

impl LocationSink {
    /// Publishes a fresh reading, replacing any previous one.
    pub fn publish(&self, reading: LocationReading) {
        let _ = self.tx.send_replace(Some(reading));
    }

    /// Clears the current reading (e.g. after a permission revocation).
    pub fn invalidate(&self) {
        let _ = self.tx.send_replace(None);
    }
}

/// Read side: serves the most recent published reading.
pub struct ChannelLocationProvider {
    rx: watch::Receiver<Option<LocationReading>>,
}

impl ChannelLocationProvider {
    /// Creates a provider/sink pair.
    pub fn new() -> (Self, LocationSink) {
        let (tx, rx) = watch::channel(None);
        (Self { rx }, LocationSink { tx })
    }
}

#[async_trait]
impl LocationProvider for ChannelLocationProvider {
    async fn current_position(&self) -> Result<LocationReading, LocationError> {
        self.rx
            .borrow()
            .clone()
            .ok_or_else(|| LocationError::Unavailable("no reading published yet".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::LocationFix;

    fn flat_reading(latitude: f64, longitude: f64) -> LocationReading {
        LocationReading::Flat {
            latitude,
            longitude,
            accuracy: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn provider_starts_empty() {
        let (provider, _sink) = ChannelLocationProvider::new();
        let err = provider.current_position().await.unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn provider_serves_latest_reading() {
        let (provider, sink) = ChannelLocationProvider::new();
        sink.publish(flat_reading(1.0, 2.0));
        sink.publish(flat_reading(3.0, 4.0));

        let fix: LocationFix = provider.current_position().await.unwrap().normalize();
        assert_eq!((fix.latitude, fix.longitude), (3.0, 4.0));
    }

    #[tokio::test]
    async fn invalidate_clears_the_reading() {
        let (provider, sink) = ChannelLocationProvider::new();
        sink.publish(flat_reading(1.0, 2.0));
        sink.invalidate();

        assert!(provider.current_position().await.is_err());
    }
}
