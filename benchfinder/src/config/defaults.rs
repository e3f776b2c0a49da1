//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::query::DEFAULT_SEARCH_RADIUS_M;
use crate::refresh::{
    DEFAULT_DATASET_URL, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_REFRESH_INTERVAL_SECS,
};
use crate::store::{DEFAULT_NAMESPACE, DEFAULT_RETAINED_GENERATIONS};

/// Default snapshot file name inside the config directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = "benches.snapshot";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "benchfinder.log";

/// Default snapshot path (`~/.benchfinder/benches.snapshot`).
pub fn default_snapshot_path() -> PathBuf {
    config_directory().join(DEFAULT_SNAPSHOT_FILE)
}

/// Default log directory (`~/.benchfinder/logs`).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dataset: DatasetSettings {
                url: DEFAULT_DATASET_URL.to_string(),
                timeout: DEFAULT_FETCH_TIMEOUT_SECS,
                refresh_interval: DEFAULT_REFRESH_INTERVAL_SECS,
                refresh_on_start: true,
            },
            search: SearchSettings {
                radius: DEFAULT_SEARCH_RADIUS_M,
            },
            store: StoreSettings {
                namespace: DEFAULT_NAMESPACE.to_string(),
                retained_generations: DEFAULT_RETAINED_GENERATIONS,
                snapshot: Some(default_snapshot_path()),
            },
            logging: LoggingSettings {
                directory: default_log_directory(),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
