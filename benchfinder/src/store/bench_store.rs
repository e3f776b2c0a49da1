//! Bench store: geospatial index and attribute table behind one API.
//!
//! # Generations
//!
//! The index and the table are two separate backend structures, so they
//! cannot be replaced in one backend operation. Instead every replace writes
//! a complete new *generation* next to the live one and then flips a single
//! pointer key:
//!
//! ```text
//!   <ns>:active        -> "7"              (one string write = the swap)
//!   <ns>:retired       -> "5"              (highest generation deleted)
//!   <ns>:g7            geo set  id -> point
//!   <ns>:g7:<gis_id>   hash     attribute record
//!   <ns>:g6 ...        previous generation, kept for in-flight readers
//! ```
//!
//! Readers resolve the pointer once and then only touch that generation, so
//! they see either the whole old dataset or the whole new one. Superseded
//! generations are deleted lazily, `retained_generations` replaces later.
//! At least one superseded generation is always kept, so a reader that
//! resolved the pointer just before a swap can finish its read. Cleanup
//! resumes from `<ns>:retired`, so a generation whose deletion failed is
//! retried by the next replace.
//!
//! Writers are serialized by an async mutex. A replace that fails or is
//! cancelled before the swap discards its staged generation and leaves the
//! pointer untouched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::bench::{Bench, BenchLocation};
use crate::geo::InvalidCoordinate;
use crate::store::attributes::AttributeTable;
use crate::store::backend::StoreBackend;
use crate::store::cancel::cancellable;
use crate::store::geo_index::GeoIndex;
use crate::store::StoreError;

/// Default key namespace.
pub const DEFAULT_NAMESPACE: &str = "benches";

/// Default number of superseded generations kept for in-flight readers.
pub const DEFAULT_RETAINED_GENERATIONS: u64 = 1;

/// Fewest superseded generations a store keeps.
pub const MIN_RETAINED_GENERATIONS: u64 = 1;

/// Configuration for a [`BenchStore`].
#[derive(Clone, Debug)]
pub struct BenchStoreConfig {
    /// Prefix of every key the store writes.
    pub namespace: String,

    /// Superseded generations kept after a swap before being deleted.
    /// Values below [`MIN_RETAINED_GENERATIONS`] are raised to it.
    pub retained_generations: u64,
}

impl Default for BenchStoreConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            retained_generations: DEFAULT_RETAINED_GENERATIONS,
        }
    }
}

impl BenchStoreConfig {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_retained_generations(mut self, retained: u64) -> Self {
        self.retained_generations = retained.max(MIN_RETAINED_GENERATIONS);
        self
    }
}

/// Outcome of a successful [`BenchStore::replace_all`].
#[derive(Clone, Debug)]
pub struct ReplaceSummary {
    /// Generation that is now active.
    pub generation: u64,

    /// Generation that was active before, if any.
    pub previous_generation: Option<u64>,

    /// Distinct benches in the new dataset.
    pub record_count: usize,

    /// Superseded generations deleted by this replace, oldest first.
    pub retired_generations: Vec<u64>,

    /// Deleting a superseded generation failed; the dataset itself is fine
    /// and the next replace retries it.
    pub cleanup_error: Option<String>,

    /// Time spent staging and swapping.
    pub duration: Duration,

    pub completed_at: DateTime<Utc>,
}

/// One generation's index and table.
#[derive(Clone)]
struct Generation {
    number: u64,
    index: GeoIndex,
    table: AttributeTable,
}

impl Generation {
    async fn clear(&self) -> Result<(), StoreError> {
        self.index.remove_all().await?;
        self.table.remove_all().await?;
        Ok(())
    }
}

/// A read view pinned to the generation that was active when it was taken.
///
/// Use one snapshot to run a nearby search and resolve its hits, so both
/// steps read the same dataset.
#[derive(Clone)]
pub struct DatasetSnapshot {
    generation: Generation,
}

impl DatasetSnapshot {
    /// The pinned generation, `None` if the store has never been filled.
    pub fn generation(&self) -> Option<u64> {
        (self.generation.number > 0).then_some(self.generation.number)
    }

    /// Benches within `radius_m` meters of the point, nearest first.
    pub async fn nearby_search(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<BenchLocation>, StoreError> {
        cancellable(cancel, self.generation.index.radius_query(lon, lat, radius_m)).await
    }

    /// Full record for `gis_id`.
    pub async fn get_by_id(
        &self,
        gis_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Bench, StoreError> {
        cancellable(cancel, self.generation.table.get(gis_id)).await
    }
}

/// The bench store.
pub struct BenchStore {
    backend: Arc<dyn StoreBackend>,
    config: BenchStoreConfig,
    writer: Mutex<()>,
}

impl BenchStore {
    pub fn new(backend: Arc<dyn StoreBackend>, mut config: BenchStoreConfig) -> Self {
        config.retained_generations = config.retained_generations.max(MIN_RETAINED_GENERATIONS);
        Self {
            backend,
            config,
            writer: Mutex::new(()),
        }
    }

    pub fn with_defaults(backend: Arc<dyn StoreBackend>) -> Self {
        Self::new(backend, BenchStoreConfig::default())
    }

    pub fn config(&self) -> &BenchStoreConfig {
        &self.config
    }

    fn active_key(&self) -> String {
        format!("{}:active", self.config.namespace)
    }

    fn retired_key(&self) -> String {
        format!("{}:retired", self.config.namespace)
    }

    fn generation(&self, number: u64) -> Generation {
        let namespace = format!("{}:g{}", self.config.namespace, number);
        Generation {
            number,
            index: GeoIndex::new(Arc::clone(&self.backend), namespace.clone()),
            table: AttributeTable::new(Arc::clone(&self.backend), namespace),
        }
    }

    /// Active generation number, 0 when nothing was ever stored.
    async fn read_pointer(&self) -> Result<u64, StoreError> {
        match self.backend.get_string(&self.active_key()).await? {
            None => Ok(0),
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| StoreError::CorruptPointer(value)),
        }
    }

    /// The currently active generation.
    pub async fn active_generation(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<u64>, StoreError> {
        let number = cancellable(cancel, self.read_pointer()).await?;
        Ok((number > 0).then_some(number))
    }

    /// Pins the active generation for consistent reads.
    pub async fn snapshot(&self, cancel: &CancellationToken) -> Result<DatasetSnapshot, StoreError> {
        let number = cancellable(cancel, self.read_pointer()).await?;
        Ok(DatasetSnapshot {
            generation: self.generation(number),
        })
    }

    /// Benches within `radius_m` meters of `(lat, lon)`, nearest first, ties
    /// by identifier. Attributes are not resolved.
    pub async fn nearby_search(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<BenchLocation>, StoreError> {
        self.snapshot(cancel)
            .await?
            .nearby_search(lat, lon, radius_m, cancel)
            .await
    }

    /// Full record for `gis_id` in the active dataset.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the identifier is not in the active dataset.
    pub async fn get_by_id(
        &self,
        gis_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Bench, StoreError> {
        self.snapshot(cancel).await?.get_by_id(gis_id, cancel).await
    }

    /// Replaces the whole dataset with `benches`.
    ///
    /// The batch is validated before anything is written. The new dataset
    /// becomes visible to readers in one step, only once it is fully
    /// written. An empty batch produces an empty dataset.
    ///
    /// # Errors
    ///
    /// - `MissingIdentifier` / `InvalidCoordinates` for a bad batch
    /// - `Backend` if the backend fails while staging or swapping
    /// - `Cancelled` if `cancel` fires before the swap
    ///
    /// In every error case the previously active dataset stays active.
    pub async fn replace_all(
        &self,
        benches: Vec<Bench>,
        cancel: &CancellationToken,
    ) -> Result<ReplaceSummary, StoreError> {
        validate_batch(&benches)?;

        let _writer = cancellable(cancel, async { Ok(self.writer.lock().await) }).await?;
        let start = Instant::now();

        let current = cancellable(cancel, self.read_pointer()).await?;
        let staged = self.generation(current + 1);

        let record_count = match cancellable(cancel, stage(&staged, &benches)).await {
            Ok(count) => count,
            Err(e) => {
                // Best effort: a leftover is cleared again by the next replace
                let _ = staged.clear().await;
                return Err(e);
            }
        };

        if cancel.is_cancelled() {
            let _ = staged.clear().await;
            return Err(StoreError::Cancelled);
        }

        if let Err(e) = self
            .backend
            .set_string(&self.active_key(), staged.number.to_string())
            .await
        {
            let _ = staged.clear().await;
            return Err(e.into());
        }

        let through = staged
            .number
            .saturating_sub(self.config.retained_generations.saturating_add(1));
        let (retired_generations, cleanup_error) = self.retire_through(through).await;

        Ok(ReplaceSummary {
            generation: staged.number,
            previous_generation: (current > 0).then_some(current),
            record_count,
            retired_generations,
            cleanup_error,
            duration: start.elapsed(),
            completed_at: Utc::now(),
        })
    }

    /// Deletes every generation up to `through` that earlier replaces have
    /// not deleted yet. Stops at the first failure.
    async fn retire_through(&self, through: u64) -> (Vec<u64>, Option<String>) {
        let mut retired = Vec::new();
        let done = match self.backend.get_string(&self.retired_key()).await {
            Ok(value) => value.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0),
            Err(e) => return (retired, Some(e.to_string())),
        };

        let mut error = None;
        for number in done.saturating_add(1)..=through {
            match self.generation(number).clear().await {
                Ok(()) => retired.push(number),
                Err(e) => {
                    error = Some(format!("generation {number}: {e}"));
                    break;
                }
            }
        }

        if let Some(&last) = retired.last() {
            if let Err(e) = self
                .backend
                .set_string(&self.retired_key(), last.to_string())
                .await
            {
                error.get_or_insert_with(|| e.to_string());
            }
        }

        (retired, error)
    }
}

/// Writes a full generation: clear leftovers, index, then attributes.
async fn stage(generation: &Generation, benches: &[Bench]) -> Result<usize, StoreError> {
    generation.clear().await?;

    let points = benches
        .iter()
        .map(|bench| (bench.gis_id.clone(), bench.location()))
        .collect();
    let record_count = generation.index.upsert_all(points).await?;
    generation.table.upsert_all(benches).await?;

    Ok(record_count)
}

/// Checks identifiers and coordinates of the whole batch.
fn validate_batch(benches: &[Bench]) -> Result<(), StoreError> {
    if let Some(position) = benches.iter().position(|b| b.gis_id.is_empty()) {
        return Err(StoreError::MissingIdentifier { position });
    }

    let invalid: Vec<InvalidCoordinate> = benches
        .iter()
        .filter_map(|bench| bench.location().validate(&bench.gis_id).err())
        .collect();
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(StoreError::InvalidCoordinates(invalid))
    }
}
