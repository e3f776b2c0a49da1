//! BenchFinder - nearby public benches from open data
//!
//! This library keeps a geospatial dataset of benches, answers "what is near
//! this coordinate" queries, and periodically replaces the whole dataset from
//! an open-data feed without readers ever seeing a half-written dataset.
//!
//! # Modules
//!
//! - [`bench`] - the bench record and the feed decoder
//! - [`geo`] - coordinates and haversine distance
//! - [`store`] - geospatial index, attribute table and the generation-swapping
//!   [`store::BenchStore`]
//! - [`query`] - nearby search with full records
//! - [`refresh`] - dataset sources, the refresh pipeline and scheduler
//! - [`app`] - application bootstrap and shutdown
//! - [`config`] - `~/.benchfinder/config.ini`
//! - [`logging`] - tracing subscriber setup

pub mod app;
pub mod bench;
pub mod config;
pub mod geo;
pub mod logging;
pub mod query;
pub mod refresh;
pub mod store;

/// Version of the BenchFinder library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
