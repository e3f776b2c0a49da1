//! Application bootstrap implementation.

use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::query::NearbyFinder;
use crate::refresh::{
    DatasetSource, HttpDatasetSource, RefreshOutcome, RefreshPipeline, RefreshScheduler,
    SchedulerStats,
};
use crate::store::{BenchStore, MemoryBackend};

/// BenchFinder application with service lifecycle management.
///
/// Services are created in dependency order: backend (restored from the
/// snapshot when one exists), store, source and pipeline, query path. The
/// refresh scheduler only runs once [`start_scheduler`](Self::start_scheduler)
/// is called.
pub struct BenchFinderApp {
    backend: Arc<MemoryBackend>,
    store: Arc<BenchStore>,
    pipeline: Arc<RefreshPipeline<HttpDatasetSource>>,
    finder: NearbyFinder,
    config: AppConfig,
    shutdown: CancellationToken,
    scheduler: Option<JoinHandle<SchedulerStats>>,
}

impl BenchFinderApp {
    /// Start the application with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read, or the
    /// HTTP client cannot be built.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        if !config.search_radius_m.is_finite() || config.search_radius_m < 0.0 {
            return Err(AppError::Config(format!(
                "search radius must be a non-negative number of meters, got {}",
                config.search_radius_m
            )));
        }

        let backend = Arc::new(Self::open_backend(config.snapshot_path.as_deref()).await?);
        let store = Arc::new(BenchStore::new(backend.clone(), config.store.clone()));

        let source = HttpDatasetSource::with_timeout(&config.dataset_url, config.fetch_timeout)?;
        let pipeline = Arc::new(RefreshPipeline::new(source, Arc::clone(&store)));
        let finder = NearbyFinder::with_radius(Arc::clone(&store), config.search_radius_m);

        let generation = store.active_generation(&CancellationToken::new()).await;
        info!(
            namespace = %config.store.namespace,
            generation = ?generation.ok().flatten(),
            url = %config.dataset_url,
            "BenchFinder started"
        );

        Ok(Self {
            backend,
            store,
            pipeline,
            finder,
            config,
            shutdown: CancellationToken::new(),
            scheduler: None,
        })
    }

    async fn open_backend(snapshot: Option<&Path>) -> Result<MemoryBackend, AppError> {
        let Some(path) = snapshot.filter(|p| p.exists()) else {
            return Ok(MemoryBackend::new());
        };

        let path = path.to_path_buf();
        let restored = tokio::task::spawn_blocking(move || {
            let backend = MemoryBackend::restore_from(&path);
            (path, backend)
        })
        .await
        .map_err(|e| AppError::Task(e.to_string()))?;

        match restored {
            (path, Ok(backend)) => {
                info!(path = %path.display(), "Restored dataset snapshot");
                Ok(backend)
            }
            (_, Err(e)) => Err(AppError::SnapshotRestore(e)),
        }
    }

    pub fn store(&self) -> Arc<BenchStore> {
        Arc::clone(&self.store)
    }

    pub fn finder(&self) -> &NearbyFinder {
        &self.finder
    }

    pub fn pipeline(&self) -> Arc<RefreshPipeline<HttpDatasetSource>> {
        Arc::clone(&self.pipeline)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token cancelled when the application shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Refresh from the configured URL.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<RefreshOutcome, AppError> {
        Ok(self.pipeline.run(cancel).await?)
    }

    /// Refresh once from another source, e.g. a local file.
    pub async fn refresh_from<S: DatasetSource>(
        &self,
        source: S,
        cancel: &CancellationToken,
    ) -> Result<RefreshOutcome, AppError> {
        let pipeline = RefreshPipeline::new(source, Arc::clone(&self.store));
        Ok(pipeline.run(cancel).await?)
    }

    /// Spawn the periodic refresh scheduler. Calling it twice is a no-op.
    pub fn start_scheduler(&mut self) {
        if self.scheduler.is_some() {
            return;
        }

        let scheduler =
            RefreshScheduler::new(Arc::clone(&self.pipeline), self.config.scheduler.clone());
        self.scheduler = Some(tokio::spawn(scheduler.run(self.shutdown.child_token())));
    }

    /// Write the dataset snapshot if a snapshot path is configured.
    pub async fn persist(&self) -> Result<(), AppError> {
        let Some(path) = self.config.snapshot_path.clone() else {
            return Ok(());
        };

        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.persist_to(&path))
            .await
            .map_err(|e| AppError::Task(e.to_string()))?
            .map_err(AppError::SnapshotPersist)
    }

    /// Shutdown the application gracefully.
    ///
    /// Stops the scheduler (cancelling an in-flight refresh), then persists
    /// the snapshot. Returns the scheduler counters if it was running.
    pub async fn shutdown(mut self) -> Result<Option<SchedulerStats>, AppError> {
        info!("Shutting down BenchFinder");
        self.shutdown.cancel();

        let stats = match self.scheduler.take() {
            Some(handle) => match handle.await {
                Ok(stats) => {
                    info!(
                        runs = stats.runs,
                        replaced = stats.replaced,
                        failed = stats.failed,
                        "Refresh scheduler stopped"
                    );
                    Some(stats)
                }
                Err(e) => {
                    warn!(error = %e, "Refresh scheduler task failed");
                    None
                }
            },
            None => None,
        };

        self.persist().await?;
        info!("BenchFinder shutdown complete");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::Bench;
    use crate::refresh::{FileDatasetSource, RefreshSchedulerConfig};
    use std::time::Duration;
    use tempfile::tempdir;

    fn quiet_scheduler() -> RefreshSchedulerConfig {
        RefreshSchedulerConfig {
            refresh_on_start: false,
            ..RefreshSchedulerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_app_start_and_shutdown() {
        let app = BenchFinderApp::start(AppConfig::default()).await.unwrap();
        let cancel = CancellationToken::new();

        assert_eq!(app.store().active_generation(&cancel).await.unwrap(), None);
        assert_eq!(app.finder().radius_m(), 250.0);

        assert!(app.shutdown().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_negative_radius() {
        let config = AppConfig::default().with_search_radius(-1.0);
        assert!(matches!(
            BenchFinderApp::start(config).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_from_file_then_persist_and_restore() {
        let temp_dir = tempdir().unwrap();
        let feed = temp_dir.path().join("benches.json");
        let snapshot = temp_dir.path().join("state").join("benches.snapshot");
        std::fs::write(
            &feed,
            r#"[{"gis_id": "A1", "longitud": 2.15, "latitud": 41.38, "nom_barri": "el Raval"}]"#,
        )
        .unwrap();

        let config = AppConfig::default().with_snapshot_path(&snapshot);
        let cancel = CancellationToken::new();

        let app = BenchFinderApp::start(config.clone()).await.unwrap();
        let outcome = app
            .refresh_from(FileDatasetSource::new(&feed), &cancel)
            .await
            .unwrap();
        assert!(matches!(outcome, RefreshOutcome::Replaced(_)));
        app.shutdown().await.unwrap();
        assert!(snapshot.exists());

        let restored = BenchFinderApp::start(config).await.unwrap();
        let nearby = restored.finder().find(41.3801, 2.1501, &cancel).await.unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby.benches[0].bench.neighborhood_name, "el Raval");
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_fails_start() {
        let temp_dir = tempdir().unwrap();
        let snapshot = temp_dir.path().join("benches.snapshot");
        std::fs::write(&snapshot, b"not a snapshot").unwrap();

        let config = AppConfig::default().with_snapshot_path(&snapshot);
        assert!(matches!(
            BenchFinderApp::start(config).await,
            Err(AppError::SnapshotRestore(_))
        ));
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_shutdown() {
        let mut app = BenchFinderApp::start(AppConfig::default().with_scheduler(quiet_scheduler()))
            .await
            .unwrap();
        app.start_scheduler();
        app.start_scheduler();

        let stats = tokio::time::timeout(Duration::from_secs(5), app.shutdown())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats, Some(SchedulerStats::default()));
    }

    #[tokio::test]
    async fn test_store_shared_with_finder() {
        let app = BenchFinderApp::start(AppConfig::default()).await.unwrap();
        let cancel = CancellationToken::new();
        app.store()
            .replace_all(vec![Bench::new("B2", 2.15, 41.38)], &cancel)
            .await
            .unwrap();

        let nearby = app.finder().find(41.38, 2.15, &cancel).await.unwrap();
        assert_eq!(nearby.benches[0].bench.gis_id, "B2");
    }
}
