//! BenchFinder CLI - Command-line interface
//!
//! Refreshes the bench dataset from open data and answers nearby queries.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::nearby::NearbyArgs;
use commands::refresh::RefreshArgs;

#[derive(Parser)]
#[command(name = "benchfinder")]
#[command(version = benchfinder::VERSION)]
#[command(about = "Find the nearest public benches, refreshed from open data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create ~/.benchfinder/config.ini with default settings
    Init,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Replace the dataset from the configured feed, a URL or a local file
    Refresh {
        /// Read the feed from a local JSON file
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// Download the feed from this URL instead of the configured one
        #[arg(long)]
        url: Option<String>,
    },

    /// List benches near a coordinate
    Nearby {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters (defaults to the configured radius)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Keep the dataset fresh and answer `lat,lon` lines on stdin
    Serve,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::Refresh { file, url } => commands::refresh::run(RefreshArgs { file, url }),
        Commands::Nearby { lat, lon, radius } => {
            commands::nearby::run(NearbyArgs { lat, lon, radius })
        }
        Commands::Serve => commands::serve::run(),
    };

    if let Err(e) = result {
        e.exit();
    }
}
