//! Periodic dataset refresh daemon.
//!
//! The [`RefreshScheduler`] is a long-running background task that runs the
//! [`RefreshPipeline`] on a fixed interval until its shutdown token fires.
//! Every run gets its own deadline; a failed run is logged and the next tick
//! tries again.
//!
//! # Example
//!
//! ```ignore
//! use benchfinder::refresh::{RefreshScheduler, RefreshSchedulerConfig};
//!
//! let scheduler = RefreshScheduler::new(pipeline, RefreshSchedulerConfig::default());
//!
//! let shutdown = CancellationToken::new();
//! let handle = tokio::spawn(scheduler.run(shutdown.clone()));
//!
//! // Later
//! shutdown.cancel();
//! let stats = handle.await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::refresh::pipeline::{RefreshError, RefreshOutcome, RefreshPipeline};
use crate::refresh::source::DatasetSource;
use crate::store::deadline_token;

/// Default time between refreshes (one day).
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default deadline for a single refresh run.
pub const DEFAULT_REFRESH_DEADLINE_SECS: u64 = 5 * 60;

/// Configuration for the refresh scheduler.
#[derive(Clone, Debug)]
pub struct RefreshSchedulerConfig {
    /// Time between runs.
    pub interval: Duration,

    /// Maximum duration of one run.
    pub run_deadline: Duration,

    /// Run once immediately instead of waiting a full interval.
    pub refresh_on_start: bool,
}

impl Default for RefreshSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            run_deadline: Duration::from_secs(DEFAULT_REFRESH_DEADLINE_SECS),
            refresh_on_start: true,
        }
    }
}

/// Counters reported when the scheduler stops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub runs: u64,
    pub replaced: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Runs a refresh pipeline periodically.
pub struct RefreshScheduler<S: DatasetSource> {
    pipeline: Arc<RefreshPipeline<S>>,
    config: RefreshSchedulerConfig,
}

impl<S: DatasetSource + 'static> RefreshScheduler<S> {
    pub fn new(pipeline: Arc<RefreshPipeline<S>>, config: RefreshSchedulerConfig) -> Self {
        Self { pipeline, config }
    }

    /// Runs until `shutdown` is cancelled, returning run counters.
    pub async fn run(self, shutdown: CancellationToken) -> SchedulerStats {
        let mut stats = SchedulerStats::default();
        let start = if self.config.refresh_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + self.config.interval
        };
        let mut ticker = tokio::time::interval_at(start, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval.as_secs(),
            "Refresh scheduler started"
        );

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Refresh scheduler shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    let run_token = deadline_token(&shutdown, self.config.run_deadline);
                    let result = self.pipeline.run(&run_token).await;
                    run_token.cancel();

                    stats.runs += 1;
                    match result {
                        Ok(RefreshOutcome::Replaced(_)) => stats.replaced += 1,
                        Ok(_) => stats.skipped += 1,
                        Err(RefreshError::Cancelled) if shutdown.is_cancelled() => {
                            stats.failed += 1;
                            break;
                        }
                        Err(e) => {
                            stats.failed += 1;
                            error!(error = %e, "Scheduled refresh failed");
                        }
                    }
                }
            }
        }

        stats
    }
}
