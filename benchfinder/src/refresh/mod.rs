//! Dataset refresh: fetch the open-data feed and replace the store.
//!
//! # Architecture
//!
//! ```text
//! RefreshScheduler ──tick──► RefreshPipeline ──► DatasetSource::fetch
//!                                  │
//!                                  ├──► decode_benches
//!                                  ├──► policy (empty / unchanged → skip)
//!                                  └──► BenchStore::replace_all
//! ```

mod pipeline;
mod scheduler;
mod source;

pub use pipeline::{RefreshError, RefreshOutcome, RefreshPipeline};
pub use scheduler::{
    RefreshScheduler, RefreshSchedulerConfig, SchedulerStats, DEFAULT_REFRESH_DEADLINE_SECS,
    DEFAULT_REFRESH_INTERVAL_SECS,
};
pub use source::{
    DatasetSource, FileDatasetSource, HttpDatasetSource, SourceError, DEFAULT_DATASET_URL,
    DEFAULT_FETCH_TIMEOUT_SECS,
};
