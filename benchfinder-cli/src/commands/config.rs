//! Configuration CLI commands.

use benchfinder::config::{config_file_path, ConfigFile, DATASET_URL_ENV};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    println!();
    for line in settings_lines(&config) {
        println!("{}", line);
    }

    if std::env::var(DATASET_URL_ENV).is_ok() {
        println!();
        println!("(dataset.url overridden by {})", DATASET_URL_ENV);
    }
    Ok(())
}

fn settings_lines(config: &ConfigFile) -> Vec<String> {
    let snapshot = config
        .store
        .snapshot
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string());

    vec![
        "[dataset]".to_string(),
        format!("  url = {}", config.dataset.url),
        format!("  timeout = {}", config.dataset.timeout),
        format!("  refresh_interval = {}", config.dataset.refresh_interval),
        format!("  refresh_on_start = {}", config.dataset.refresh_on_start),
        String::new(),
        "[search]".to_string(),
        format!("  radius = {}", config.search.radius),
        String::new(),
        "[store]".to_string(),
        format!("  namespace = {}", config.store.namespace),
        format!("  retained_generations = {}", config.store.retained_generations),
        format!("  snapshot = {}", snapshot),
        String::new(),
        "[logging]".to_string(),
        format!("  directory = {}", config.logging.directory.display()),
        format!("  file = {}", config.logging.file),
    ]
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}
