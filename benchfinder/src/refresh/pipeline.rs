//! Refresh pipeline: fetch, decode, replace.
//!
//! The pipeline owns the refresh *policy*; the store only knows how to
//! replace. An empty feed is treated as an upstream glitch and never wipes
//! the dataset, and a feed identical to the last applied one is skipped as
//! long as the generation it produced is still the active one.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bench::{decode_benches, DecodeError};
use crate::refresh::source::{DatasetSource, SourceError};
use crate::store::{BenchStore, ReplaceSummary, StoreError};

/// Errors that abort a refresh. The previously active dataset is kept.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to fetch dataset: {0}")]
    Fetch(#[from] SourceError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Failed to replace dataset: {0}")]
    Store(#[from] StoreError),

    #[error("Refresh cancelled")]
    Cancelled,
}

/// What a refresh run did.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The dataset was replaced.
    Replaced(ReplaceSummary),

    /// The feed decoded to zero records; the store was left alone.
    SkippedEmpty,

    /// The feed is byte-identical to the one that produced the active
    /// generation.
    Unchanged { digest: String },
}

/// Payload digest and the generation it was applied as.
#[derive(Debug, Clone)]
struct AppliedFeed {
    digest: String,
    generation: u64,
}

/// Fetches the feed from a source and applies it to the store.
pub struct RefreshPipeline<S: DatasetSource> {
    source: S,
    store: Arc<BenchStore>,
    last_applied: Mutex<Option<AppliedFeed>>,
}

impl<S: DatasetSource> RefreshPipeline<S> {
    pub fn new(source: S, store: Arc<BenchStore>) -> Self {
        Self {
            source,
            store,
            last_applied: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<BenchStore> {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Digest of the last payload successfully applied, hex-encoded.
    pub fn last_digest(&self) -> Option<String> {
        self.last_applied.lock().as_ref().map(|a| a.digest.clone())
    }

    /// Runs one refresh.
    ///
    /// # Errors
    ///
    /// Any fetch, decode or store failure aborts the run with the current
    /// dataset untouched.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<RefreshOutcome, RefreshError> {
        let start = Instant::now();
        let origin = self.source.describe();
        info!(source = %origin, "Refreshing bench dataset");

        let payload = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RefreshError::Cancelled),
            payload = self.source.fetch() => payload?,
        };

        let digest = hex_digest(&payload);
        debug!(bytes = payload.len(), digest = %digest, "Fetched dataset");

        let applied = self.last_applied.lock().clone();
        if let Some(applied) = applied.filter(|a| a.digest == digest) {
            let active = self
                .store
                .active_generation(cancel)
                .await
                .map_err(|e| match e {
                    StoreError::Cancelled => RefreshError::Cancelled,
                    other => RefreshError::Store(other),
                })?;
            if active == Some(applied.generation) {
                info!(digest = %digest, "Dataset unchanged since last refresh, skipping");
                return Ok(RefreshOutcome::Unchanged { digest });
            }
            debug!(
                applied = applied.generation,
                active = ?active,
                "Dataset replaced by another writer, reapplying"
            );
        }

        let benches = decode_benches(&payload).map_err(|e| {
            warn!(error = %e, line = e.line(), "Failed to decode dataset");
            e
        })?;

        if benches.is_empty() {
            warn!(source = %origin, "Dataset is empty, keeping current benches");
            return Ok(RefreshOutcome::SkippedEmpty);
        }

        let summary = self.store.replace_all(benches, cancel).await.map_err(|e| match e {
            StoreError::Cancelled => RefreshError::Cancelled,
            other => RefreshError::Store(other),
        })?;

        if let Some(error) = &summary.cleanup_error {
            warn!(
                retired = ?summary.retired_generations,
                error = %error,
                "Failed to retire superseded generation"
            );
        }

        *self.last_applied.lock() = Some(AppliedFeed {
            digest,
            generation: summary.generation,
        });

        info!(
            benches = summary.record_count,
            generation = summary.generation,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bench dataset replaced"
        );

        Ok(RefreshOutcome::Replaced(summary))
    }
}

fn hex_digest(payload: &[u8]) -> String {
    let hash = Sha256::digest(payload);
    let mut hex = String::with_capacity(hash.len() * 2);
    for byte in hash {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}
