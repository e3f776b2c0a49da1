//! Application configuration for BenchFinderApp.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::query::DEFAULT_SEARCH_RADIUS_M;
use crate::refresh::{RefreshSchedulerConfig, DEFAULT_DATASET_URL, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::store::BenchStoreConfig;

/// Everything needed to bootstrap the application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Feed URL.
    pub dataset_url: String,

    /// HTTP timeout for one download.
    pub fetch_timeout: Duration,

    /// Background refresh settings.
    pub scheduler: RefreshSchedulerConfig,

    /// Nearby search radius in meters.
    pub search_radius_m: f64,

    /// Store namespace and generation retention.
    pub store: BenchStoreConfig,

    /// Snapshot file; `None` keeps the dataset in memory only.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_url: DEFAULT_DATASET_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            scheduler: RefreshSchedulerConfig::default(),
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            store: BenchStoreConfig::default(),
            snapshot_path: None,
        }
    }
}

impl AppConfig {
    /// Create application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            dataset_url: config.dataset.url.clone(),
            fetch_timeout: Duration::from_secs(config.dataset.timeout),
            scheduler: RefreshSchedulerConfig {
                interval: Duration::from_secs(config.dataset.refresh_interval),
                refresh_on_start: config.dataset.refresh_on_start,
                ..RefreshSchedulerConfig::default()
            },
            search_radius_m: config.search.radius,
            store: BenchStoreConfig::default()
                .with_namespace(config.store.namespace.clone())
                .with_retained_generations(config.store.retained_generations),
            snapshot_path: config.store.snapshot.clone(),
        }
    }

    pub fn with_dataset_url(mut self, url: impl Into<String>) -> Self {
        self.dataset_url = url.into();
        self
    }

    pub fn with_search_radius(mut self, radius_m: f64) -> Self {
        self.search_radius_m = radius_m;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn with_scheduler(mut self, scheduler: RefreshSchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }
}
