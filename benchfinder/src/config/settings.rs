//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Dataset download and refresh settings
    pub dataset: DatasetSettings,
    /// Query settings
    pub search: SearchSettings,
    /// Store settings
    pub store: StoreSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// `[dataset]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSettings {
    /// Feed URL
    pub url: String,
    /// HTTP timeout in seconds
    pub timeout: u64,
    /// Seconds between scheduled refreshes
    pub refresh_interval: u64,
    /// Refresh once when the service starts
    pub refresh_on_start: bool,
}

/// `[search]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Nearby search radius in meters
    pub radius: f64,
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Key namespace in the backend
    pub namespace: String,
    /// Superseded generations kept for in-flight readers
    pub retained_generations: u64,
    /// Snapshot file; `None` keeps the dataset in memory only
    pub snapshot: Option<PathBuf>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}
