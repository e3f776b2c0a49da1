//! Integration tests for the refresh → store → query flow.
//!
//! These tests drive the public API end to end:
//! - Feed file → RefreshPipeline → BenchStore → NearbyFinder
//! - Batch rejection and dataset preservation
//! - Snapshot persistence across restarts
//!
//! Run with: `cargo test --test refresh_query_integration`

use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use benchfinder::query::NearbyFinder;
use benchfinder::refresh::{FileDatasetSource, RefreshError, RefreshOutcome, RefreshPipeline};
use benchfinder::store::{BenchStore, MemoryBackend, StoreBackend, StoreError};

// ============================================================================
// Helper Functions
// ============================================================================

/// A feed record in the open-data format.
fn record(id: &str, lon: f64, lat: f64, street: &str) -> String {
    format!(
        r#"{{"gis_id": "{id}", "tipus_de_mobiliari_urba": "Banc", "codi": "B-{id}",
            "nom_districte": "Ciutat Vella", "nom_barri": "el Raval",
            "nom_carrer": "{street}", "num_carrer": null,
            "longitud": {lon}, "latitud": {lat}, "data_alta": "2019-05-02"}}"#
    )
}

fn feed(records: &[String]) -> String {
    format!("[{}]", records.join(","))
}

struct Fixture {
    dir: TempDir,
    backend: Arc<MemoryBackend>,
    store: Arc<BenchStore>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    fn with_backend(backend: Arc<MemoryBackend>) -> Self {
        let store = Arc::new(BenchStore::with_defaults(backend.clone()));
        Self {
            dir: TempDir::new().unwrap(),
            backend,
            store,
        }
    }

    /// Write `content` as the feed file and refresh from it.
    async fn refresh(&self, content: &str) -> Result<RefreshOutcome, RefreshError> {
        let path = self.dir.path().join("benches.json");
        std::fs::write(&path, content).unwrap();

        let pipeline = RefreshPipeline::new(FileDatasetSource::new(path), Arc::clone(&self.store));
        pipeline.run(&CancellationToken::new()).await
    }

    fn finder(&self) -> NearbyFinder {
        NearbyFinder::new(Arc::clone(&self.store))
    }
}

// ============================================================================
// Integration Tests
// ============================================================================

/// One bench, found from a nearby point and not from a distant one.
#[tokio::test]
async fn test_single_bench_found_nearby() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    let outcome = fixture
        .refresh(&feed(&[record("A1", 2.15, 41.38, "Carrer del Carme")]))
        .await
        .unwrap();
    assert!(matches!(outcome, RefreshOutcome::Replaced(ref s) if s.record_count == 1));

    let hits = fixture
        .store
        .nearby_search(41.3801, 2.1501, 250.0, &cancel)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].gis_id, "A1");
    assert!(hits[0].distance_m < 20.0);

    let far = fixture
        .store
        .nearby_search(41.50, 2.15, 250.0, &cancel)
        .await
        .unwrap();
    assert!(far.is_empty());

    let nearby = fixture.finder().find(41.3801, 2.1501, &cancel).await.unwrap();
    let bench = &nearby.benches[0].bench;
    assert_eq!(bench.bench_type, "Banc");
    assert_eq!(bench.street_name, "Carrer del Carme");
    assert_eq!(bench.street_number, "");
    assert_eq!(bench.created_at, "2019-05-02");
    assert!(nearby.unresolved.is_empty());
}

/// An out-of-range latitude rejects the whole batch and names the record.
#[tokio::test]
async fn test_invalid_latitude_rejects_batch() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    fixture
        .refresh(&feed(&[record("A1", 2.15, 41.38, "Carrer del Carme")]))
        .await
        .unwrap();

    let err = fixture
        .refresh(&feed(&[
            record("B1", 2.16, 41.39, "Rambla"),
            record("B2", 2.16, 200.0, "Rambla"),
        ]))
        .await
        .unwrap_err();

    match err {
        RefreshError::Store(StoreError::InvalidCoordinates(invalid)) => {
            assert_eq!(invalid.len(), 1);
            assert_eq!(invalid[0].id, "B2");
            assert_eq!(invalid[0].latitude, 200.0);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Old dataset intact, nothing from the rejected batch visible
    assert!(fixture.store.get_by_id("A1", &cancel).await.is_ok());
    assert!(fixture.store.get_by_id("B1", &cancel).await.unwrap_err().is_not_found());
    assert_eq!(fixture.store.active_generation(&cancel).await.unwrap(), Some(1));
}

/// A replace drops records absent from the new feed.
#[tokio::test]
async fn test_refresh_replaces_whole_dataset() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    fixture
        .refresh(&feed(&[
            record("A1", 2.15, 41.38, "Carrer del Carme"),
            record("A2", 2.1502, 41.38, "Carrer del Carme"),
        ]))
        .await
        .unwrap();
    fixture
        .refresh(&feed(&[record("A2", 2.1502, 41.38, "Carrer Nou")]))
        .await
        .unwrap();

    let nearby = fixture.finder().find(41.38, 2.15, &cancel).await.unwrap();
    let ids: Vec<_> = nearby.benches.iter().map(|b| b.bench.gis_id.as_str()).collect();
    assert_eq!(ids, vec!["A2"]);
    assert_eq!(nearby.benches[0].bench.street_name, "Carrer Nou");
    assert!(fixture.store.get_by_id("A1", &cancel).await.unwrap_err().is_not_found());
}

/// An empty feed is skipped by the pipeline, an empty batch empties the store.
#[tokio::test]
async fn test_empty_feed_and_empty_batch() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    fixture
        .refresh(&feed(&[record("A1", 2.15, 41.38, "Carrer del Carme")]))
        .await
        .unwrap();

    let outcome = fixture.refresh("[]").await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::SkippedEmpty));
    assert!(fixture.store.get_by_id("A1", &cancel).await.is_ok());

    fixture.store.replace_all(Vec::new(), &cancel).await.unwrap();
    assert!(fixture
        .store
        .nearby_search(41.38, 2.15, 10_000.0, &cancel)
        .await
        .unwrap()
        .is_empty());
    assert!(fixture.store.get_by_id("A1", &cancel).await.unwrap_err().is_not_found());
}

/// Malformed feeds never touch the store.
#[tokio::test]
async fn test_malformed_feed_keeps_dataset() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    fixture
        .refresh(&feed(&[record("A1", 2.15, 41.38, "Carrer del Carme")]))
        .await
        .unwrap();

    for payload in [
        r#"{"gis_id": "A1"}"#,
        r#"[{"gis_id": "A2", "longitud": 2.15}]"#,
        r#"[{"gis_id": "A2", "longitud": "east", "latitud": 41.38}]"#,
    ] {
        let err = fixture.refresh(payload).await.unwrap_err();
        assert!(matches!(err, RefreshError::Decode(_)), "payload {payload}");
    }

    assert_eq!(fixture.store.active_generation(&cancel).await.unwrap(), Some(1));
}

/// The dataset survives a persist/restore cycle of the backend.
#[tokio::test]
async fn test_snapshot_round_trip() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    fixture
        .refresh(&feed(&[
            record("A1", 2.15, 41.38, "Carrer del Carme"),
            record("A2", 2.1502, 41.3801, "Carrer Nou"),
        ]))
        .await
        .unwrap();

    let path = fixture.dir.path().join("state").join("benches.snapshot");
    fixture.backend.persist_to(&path).unwrap();

    let restored = Fixture::with_backend(Arc::new(MemoryBackend::restore_from(&path).unwrap()));
    assert_eq!(restored.backend.key_count(), fixture.backend.key_count());
    assert_eq!(restored.store.active_generation(&cancel).await.unwrap(), Some(1));

    let original = fixture.finder().find(41.38, 2.15, &cancel).await.unwrap();
    let copy = restored.finder().find(41.38, 2.15, &cancel).await.unwrap();
    assert_eq!(original.benches, copy.benches);
}

/// Superseded generations are retired one refresh later.
#[tokio::test]
async fn test_old_generations_are_retired() {
    let fixture = Fixture::new();
    let cancel = CancellationToken::new();

    for street in ["Carrer A", "Carrer B", "Carrer C"] {
        fixture
            .refresh(&feed(&[record("A1", 2.15, 41.38, street)]))
            .await
            .unwrap();
    }

    assert_eq!(fixture.store.active_generation(&cancel).await.unwrap(), Some(3));
    // Generation 1 is gone, generations 2 and 3 remain
    assert!(fixture.backend.hash_get_all("benches:g1:A1").await.unwrap().is_none());
    assert!(fixture.backend.hash_get_all("benches:g2:A1").await.unwrap().is_some());
    assert!(fixture.backend.hash_get_all("benches:g3:A1").await.unwrap().is_some());
}
