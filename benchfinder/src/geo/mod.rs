//! Geographic primitives shared by the index and the query path.
//!
//! Points are WGS84 degrees. Distances are great-circle meters computed with
//! the haversine formula on a spherical earth.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius in meters (WGS84 arithmetic mean radius).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns true when both components are finite and inside the WGS84
    /// ranges (latitude [-90, 90], longitude [-180, 180]).
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Validates the point, attributing a failure to `id`.
    pub fn validate(&self, id: &str) -> Result<(), InvalidCoordinate> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(InvalidCoordinate {
                id: id.to_string(),
                longitude: self.longitude,
                latitude: self.latitude,
            })
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        distance_m(*self, *other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A coordinate outside the WGS84 ranges, rejected at insertion time.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid coordinate for '{id}': longitude {longitude}, latitude {latitude}")]
pub struct InvalidCoordinate {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Haversine distance between two points in meters.
///
/// Identical inputs always yield exactly `0.0`.
///
/// # Example
///
/// ```
/// use benchfinder::geo::{distance_m, GeoPoint};
///
/// // One degree of latitude is roughly 111 km
/// let d = distance_m(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
/// assert!((d - 111_195.0).abs() < 100.0);
/// ```
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.latitude * DEG_TO_RAD;
    let lat2_rad = to.latitude * DEG_TO_RAD;
    let delta_lat = (to.latitude - from.latitude) * DEG_TO_RAD;
    let delta_lon = (to.longitude - from.longitude) * DEG_TO_RAD;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.min(1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}
