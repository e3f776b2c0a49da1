//! Geospatial bench store.
//!
//! The store keeps two structures per dataset in a shared backend: a
//! geospatial index (identifier to point) and an attribute table
//! (identifier to record). [`BenchStore`] composes them and guarantees that
//! readers never see a half-replaced dataset.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        BenchStore                         │
//! │                                                           │
//! │  replace_all ──► validate ──► stage g+1 ──► swap pointer  │
//! │                                   │                       │
//! │                     ┌─────────────┴───────────┐           │
//! │                     ▼                         ▼           │
//! │                 GeoIndex               AttributeTable     │
//! │                     │                         │           │
//! │                     └──────────┬──────────────┘           │
//! │                                ▼                          │
//! │                     Arc<dyn StoreBackend>                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use benchfinder::store::{BenchStore, MemoryBackend};
//! use tokio_util::sync::CancellationToken;
//!
//! let store = BenchStore::with_defaults(Arc::new(MemoryBackend::new()));
//! let cancel = CancellationToken::new();
//!
//! store.replace_all(benches, &cancel).await?;
//! let hits = store.nearby_search(41.38, 2.15, 250.0, &cancel).await?;
//! ```
//!
//! The index and the table are only reachable through [`BenchStore`] and
//! [`DatasetSnapshot`]:
//!
//! ```compile_fail
//! use benchfinder::store::GeoIndex;
//! ```
//!
//! ```compile_fail
//! use benchfinder::store::AttributeTable;
//! ```

mod attributes;
pub mod backend;
mod bench_store;
mod cancel;
mod error;
mod geo_index;

pub use backend::{BackendError, MemoryBackend, StoreBackend};
pub use bench_store::{
    BenchStore, BenchStoreConfig, DatasetSnapshot, ReplaceSummary, DEFAULT_NAMESPACE,
    DEFAULT_RETAINED_GENERATIONS, MIN_RETAINED_GENERATIONS,
};
pub use cancel::deadline_token;
pub use error::StoreError;
