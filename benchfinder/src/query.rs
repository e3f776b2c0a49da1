//! Query path: nearby benches with their full records.
//!
//! A search runs against one [`DatasetSnapshot`](crate::store::DatasetSnapshot)
//! so the hits and the records they resolve to come from the same dataset.
//! A hit whose record cannot be found is skipped and reported, never fatal.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::bench::Bench;
use crate::store::{BenchStore, StoreError};

/// Search radius used when none is configured, in meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 250.0;

/// A resolved bench and its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyBench {
    pub bench: Bench,
    pub distance_m: f64,
}

/// Result of a nearby query.
#[derive(Debug, Clone, Default)]
pub struct NearbyBenches {
    /// Resolved benches, nearest first.
    pub benches: Vec<NearbyBench>,

    /// Identifiers found in the index whose record could not be resolved.
    pub unresolved: Vec<String>,

    /// Generation the query ran against.
    pub generation: Option<u64>,
}

impl NearbyBenches {
    pub fn is_empty(&self) -> bool {
        self.benches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.benches.len()
    }
}

/// Finds benches around a coordinate.
#[derive(Clone)]
pub struct NearbyFinder {
    store: Arc<BenchStore>,
    radius_m: f64,
}

impl NearbyFinder {
    pub fn new(store: Arc<BenchStore>) -> Self {
        Self::with_radius(store, DEFAULT_SEARCH_RADIUS_M)
    }

    pub fn with_radius(store: Arc<BenchStore>, radius_m: f64) -> Self {
        Self { store, radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Benches within the configured radius of `(lat, lon)`.
    ///
    /// # Errors
    ///
    /// Invalid input, backend failures and cancellation fail the query.
    /// Missing records only land in [`NearbyBenches::unresolved`].
    pub async fn find(
        &self,
        lat: f64,
        lon: f64,
        cancel: &CancellationToken,
    ) -> Result<NearbyBenches, StoreError> {
        let snapshot = self.store.snapshot(cancel).await?;
        let hits = snapshot
            .nearby_search(lat, lon, self.radius_m, cancel)
            .await?;

        let mut result = NearbyBenches {
            benches: Vec::with_capacity(hits.len()),
            unresolved: Vec::new(),
            generation: snapshot.generation(),
        };

        for hit in hits {
            match snapshot.get_by_id(&hit.gis_id, cancel).await {
                Ok(bench) => result.benches.push(NearbyBench {
                    bench,
                    distance_m: hit.distance_m,
                }),
                Err(StoreError::NotFound(gis_id)) => {
                    warn!(gis_id = %gis_id, "Bench in index has no record, skipping");
                    result.unresolved.push(gis_id);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            lat,
            lon,
            radius_m = self.radius_m,
            found = result.benches.len(),
            unresolved = result.unresolved.len(),
            "Nearby query complete"
        );

        Ok(result)
    }
}
