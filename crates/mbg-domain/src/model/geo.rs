//! Latitude/longitude points and the distance/interpolation math used by the
//! fleet simulation.

use mbg_types::SimulationError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SimulationError> {
        let point = Self { latitude, longitude };
        point.validate()?;
        Ok(point)
    }

    /// Whether latitude is in [-90, 90] and longitude in [-180, 180]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SimulationError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Point shifted by the given degree offsets (not validated)
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self {
            latitude: self.latitude + d_lat,
            longitude: self.longitude + d_lng,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points (haversine)
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    // Both deltas are squared through sin², so swapping a and b yields the
    // same bits.
    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().min(1.0).asin()
}

/// Linear interpolation in lat/lng space
///
/// `fraction` is clamped to [0, 1]. The endpoints are returned exactly.
pub fn interpolate(current: GeoPoint, destination: GeoPoint, fraction: f64) -> GeoPoint {
    let t = fraction.clamp(0.0, 1.0);
    if t <= 0.0 {
        return current;
    }
    if t >= 1.0 {
        return destination;
    }
    GeoPoint {
        latitude: current.latitude + (destination.latitude - current.latitude) * t,
        longitude: current.longitude + (destination.longitude - current.longitude) * t,
    }
}
