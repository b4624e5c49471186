use serde::{Deserialize, Serialize};

/// Coordinate pair. Interpreted as degrees by the great-circle provider and
/// as plain planar coordinates by the straight-line provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Zero-based capability category of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub usize);

impl CategoryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A mobile response unit. Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u64,
    pub location: Location,
    pub category: CategoryId,
}
