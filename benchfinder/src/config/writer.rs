//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let snapshot = config
        .store
        .snapshot
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();

    format!(
        r#"[dataset]
; Open-data feed with the benches (JSON array)
; Overridden by the BENCHES_DATASET_URL environment variable
url = {}
; HTTP timeout in seconds
timeout = {}
; Seconds between scheduled refreshes (default: 86400, one day)
refresh_interval = {}
; Refresh once when the service starts (true/false)
refresh_on_start = {}

[search]
; Radius of the nearby search in meters
radius = {}

[store]
; Key namespace in the store
namespace = {}
; Superseded datasets kept for readers still using them (at least 1)
retained_generations = {}
; File the dataset is persisted to between runs
; Leave empty to keep the dataset in memory only
snapshot = {}

[logging]
directory = {}
file = {}
"#,
        config.dataset.url,
        config.dataset.timeout,
        config.dataset.refresh_interval,
        config.dataset.refresh_on_start,
        config.search.radius,
        config.store.namespace,
        config.store.retained_generations,
        snapshot,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
