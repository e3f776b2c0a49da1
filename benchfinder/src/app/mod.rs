//! Application bootstrap and lifecycle management.
//!
//! [`BenchFinderApp`] wires the backend, store, dataset source, refresh
//! pipeline and query path in one place, and owns graceful shutdown.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      BenchFinderApp                         │
//! │                                                             │
//! │  1. MemoryBackend ◄── restore snapshot (if present)         │
//! │  2. BenchStore (generations over the backend)               │
//! │  3. HttpDatasetSource ──► RefreshPipeline ──► BenchStore    │
//! │  4. RefreshScheduler (optional background task)             │
//! │  5. NearbyFinder ──► BenchStore                             │
//! │                                                             │
//! │  shutdown: cancel scheduler ──► persist snapshot            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use benchfinder::app::{AppConfig, BenchFinderApp};
//!
//! let mut app = BenchFinderApp::start(AppConfig::default()).await?;
//! app.start_scheduler();
//!
//! let nearby = app.finder().find(41.38, 2.15, &cancel).await?;
//!
//! app.shutdown().await?;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::BenchFinderApp;
pub use config::AppConfig;
pub use error::AppError;
