//! User configuration for BenchFinder.
//!
//! Settings live in `~/.benchfinder/config.ini`. A missing file yields the
//! defaults; the `BENCHES_DATASET_URL` environment variable overrides the
//! dataset URL.
//!
//! # Example
//!
//! ```
//! use benchfinder::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.search.radius, 250.0);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError, DATASET_URL_ENV};
pub use settings::{ConfigFile, DatasetSettings, LoggingSettings, SearchSettings, StoreSettings};
