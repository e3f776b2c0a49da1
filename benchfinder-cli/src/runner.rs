//! CLI runner for common setup.
//!
//! Loads the config, initializes logging and owns the async runtime so
//! command handlers stay synchronous.

use std::future::Future;

use benchfinder::app::{AppConfig, BenchFinderApp};
use benchfinder::config::ConfigFile;
use benchfinder::logging::{init_logging_full, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a runner, loading config and initializing logging.
    ///
    /// With `stdout_logging` off, logs only go to the log file so command
    /// output on stdout stays clean.
    pub fn new(stdout_logging: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let logging_guard = init_logging_full(
            &config.logging.directory,
            &config.logging.file,
            stdout_logging,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Application config derived from the config file.
    pub fn app_config(&self) -> AppConfig {
        AppConfig::from_config_file(&self.config)
    }

    pub fn log_startup(&self, command: &str) {
        info!("BenchFinder v{}", benchfinder::VERSION);
        info!("BenchFinder CLI: {} command", command);
    }

    /// Start the application on the runner's runtime.
    pub fn start_app(&self, config: AppConfig) -> Result<BenchFinderApp, CliError> {
        Ok(self.block_on(BenchFinderApp::start(config))?)
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
