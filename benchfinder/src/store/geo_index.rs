//! Geospatial index: identifier to point, with radius queries.
//!
//! The index is one geo set in the backend, keyed by its namespace.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::bench::BenchLocation;
use crate::geo::{GeoPoint, InvalidCoordinate};
use crate::store::backend::{GeoMember, StoreBackend};
use crate::store::StoreError;

/// Geospatial index bound to one backend key.
#[derive(Clone)]
pub(crate) struct GeoIndex {
    backend: Arc<dyn StoreBackend>,
    key: String,
}

impl GeoIndex {
    pub fn new(backend: Arc<dyn StoreBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Inserts or moves the given `(id, point)` entries.
    ///
    /// Entries not in `points` are left alone. The whole batch is validated
    /// first; any out-of-range point rejects the batch with every offender
    /// listed and nothing written.
    pub async fn upsert_all(&self, points: Vec<(String, GeoPoint)>) -> Result<usize, StoreError> {
        let invalid: Vec<InvalidCoordinate> = points
            .iter()
            .filter_map(|(id, point)| point.validate(id).err())
            .collect();
        if !invalid.is_empty() {
            return Err(StoreError::InvalidCoordinates(invalid));
        }

        let members = points
            .into_iter()
            .map(|(name, point)| GeoMember { name, point })
            .collect();

        Ok(self.backend.geo_add(&self.key, members).await?)
    }

    /// Removes every entry. Idempotent.
    pub async fn remove_all(&self) -> Result<(), StoreError> {
        self.backend.delete(&self.key).await?;
        Ok(())
    }

    /// Entries within `radius_m` meters of the center, nearest first.
    ///
    /// Equal distances are ordered by identifier. A zero radius matches only
    /// points stored at exactly the center.
    pub async fn radius_query(
        &self,
        center_lon: f64,
        center_lat: f64,
        radius_m: f64,
    ) -> Result<Vec<BenchLocation>, StoreError> {
        let center = GeoPoint::new(center_lon, center_lat);
        center
            .validate("query center")
            .map_err(|c| StoreError::InvalidCoordinates(vec![c]))?;
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(StoreError::InvalidRadius(radius_m));
        }

        let mut hits = self.backend.geo_radius(&self.key, center, radius_m).await?;
        hits.retain(|hit| hit.distance_m <= radius_m && (radius_m > 0.0 || hit.point == center));
        hits.sort_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(hits
            .into_iter()
            .map(|hit| BenchLocation {
                gis_id: hit.name,
                longitude: hit.point.longitude,
                latitude: hit.point.latitude,
                distance_m: hit.distance_m,
            })
            .collect())
    }
}
