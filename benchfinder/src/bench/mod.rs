//! Bench entity and its conversions.
//!
//! A [`Bench`] is decoded from the open-data feed (Catalan field names, see
//! [`decode`]) and persisted as a flat string map with English field names
//! (see [`Bench::to_attributes`]).

mod decode;

pub use decode::{decode_benches, DecodeError};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Attribute map field names, in storage order.
pub const ATTRIBUTE_FIELDS: [&str; 19] = [
    "type",
    "code",
    "description",
    "manufacturer",
    "district_code",
    "district_name",
    "neighborhood_code",
    "neighborhood_name",
    "zone",
    "street_name",
    "street_number",
    "x_etrs89",
    "y_etrs89",
    "geometry_etrs89",
    "longitude",
    "latitude",
    "geometry_wgs84",
    "created_at",
    "deleted_at",
];

/// A public bench with its location and descriptive attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bench {
    pub gis_id: String,
    pub bench_type: String,
    pub code: String,
    pub description: String,
    pub manufacturer: String,
    pub district_code: String,
    pub district_name: String,
    pub neighborhood_code: String,
    pub neighborhood_name: String,
    pub zone: String,
    pub street_name: String,
    pub street_number: String,
    pub x_etrs89: String,
    pub y_etrs89: String,
    pub geometry_etrs89: String,
    pub longitude: f64,
    pub latitude: f64,
    pub geometry_wgs84: String,
    pub created_at: String,
    pub deleted_at: String,
}

impl Bench {
    /// Creates a bench with only identity and location set.
    pub fn new(gis_id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            gis_id: gis_id.into(),
            longitude,
            latitude,
            ..Self::default()
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }

    /// Flattens the bench into its persisted attribute map.
    ///
    /// The identifier is not part of the map; it lives in the key.
    /// Coordinates use shortest round-trip formatting so that
    /// [`Bench::from_attributes`] restores them exactly.
    pub fn to_attributes(&self) -> HashMap<String, String> {
        let values = [
            self.bench_type.clone(),
            self.code.clone(),
            self.description.clone(),
            self.manufacturer.clone(),
            self.district_code.clone(),
            self.district_name.clone(),
            self.neighborhood_code.clone(),
            self.neighborhood_name.clone(),
            self.zone.clone(),
            self.street_name.clone(),
            self.street_number.clone(),
            self.x_etrs89.clone(),
            self.y_etrs89.clone(),
            self.geometry_etrs89.clone(),
            self.longitude.to_string(),
            self.latitude.to_string(),
            self.geometry_wgs84.clone(),
            self.created_at.clone(),
            self.deleted_at.clone(),
        ];

        ATTRIBUTE_FIELDS
            .iter()
            .map(|field| field.to_string())
            .zip(values)
            .collect()
    }

    /// Rebuilds a bench from its identifier and attribute map.
    ///
    /// Missing fields become empty strings; unparseable coordinates become
    /// `0.0`.
    pub fn from_attributes(gis_id: &str, mut attrs: HashMap<String, String>) -> Self {
        let mut take = |field: &str| attrs.remove(field).unwrap_or_default();
        let parse = |value: String| value.parse::<f64>().unwrap_or(0.0);

        Self {
            gis_id: gis_id.to_string(),
            bench_type: take("type"),
            code: take("code"),
            description: take("description"),
            manufacturer: take("manufacturer"),
            district_code: take("district_code"),
            district_name: take("district_name"),
            neighborhood_code: take("neighborhood_code"),
            neighborhood_name: take("neighborhood_name"),
            zone: take("zone"),
            street_name: take("street_name"),
            street_number: take("street_number"),
            x_etrs89: take("x_etrs89"),
            y_etrs89: take("y_etrs89"),
            geometry_etrs89: take("geometry_etrs89"),
            longitude: parse(take("longitude")),
            latitude: parse(take("latitude")),
            geometry_wgs84: take("geometry_wgs84"),
            created_at: take("created_at"),
            deleted_at: take("deleted_at"),
        }
    }
}

/// A nearby search hit: identifier, stored position and distance from the
/// query center.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchLocation {
    pub gis_id: String,
    pub longitude: f64,
    pub latitude: f64,
    pub distance_m: f64,
}
