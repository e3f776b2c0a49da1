//! Init command - initialize configuration file.

use benchfinder::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
///
/// Keeps any values already present in an existing config file.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();

    let config = ConfigFile::load_from(&path)?;
    config.save_to(&path)?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();
    println!("Dataset: {}", config.dataset.url);
    println!("Edit this file to customize BenchFinder settings.");
    println!("Next: benchfinder refresh");
    Ok(())
}
