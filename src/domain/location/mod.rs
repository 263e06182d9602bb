//! Device location readings and their normalized outbound form.
//!
//! Position sources report two shapes: the browser-style reading with a
//! nested `coords` object, and the flat shape used by native bridges. Both
//! normalize into a single [`LocationFix`] before transmission.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Geographic coordinates as nested inside a browser-style reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// A raw position reading in either of the two supported shapes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LocationReading {
    /// Browser geolocation shape: `{ "coords": { "latitude": ... }, ... }`.
    Nested {
        coords: Coords,
        #[serde(default)]
        timestamp: Option<Timestamp>,
    },

    /// Flat shape: `{ "latitude": ..., "longitude": ..., ... }`.
    Flat {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        accuracy: Option<f64>,
        #[serde(default)]
        timestamp: Option<Timestamp>,
    },
}

impl LocationReading {
    /// Normalizes either shape into a [`LocationFix`], stamping the current
    /// time when the reading carries none.
    pub fn normalize(self) -> LocationFix {
        match self {
            LocationReading::Nested { coords, timestamp } => LocationFix {
                latitude: coords.latitude,
                longitude: coords.longitude,
                accuracy: coords.accuracy,
                taken_at: timestamp.unwrap_or_else(Timestamp::now),
            },
            LocationReading::Flat {
                latitude,
                longitude,
                accuracy,
                timestamp,
            } => LocationFix {
                latitude,
                longitude,
                accuracy,
                taken_at: timestamp.unwrap_or_else(Timestamp::now),
            },
        }
    }
}

/// A normalized position fix, the only shape that goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub taken_at: Timestamp,
}

impl LocationFix {
    /// Creates a fix for the current moment without an accuracy estimate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            taken_at: Timestamp::now(),
        }
    }
}
