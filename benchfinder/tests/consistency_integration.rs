//! Integration tests for reader consistency during dataset replacement.
//!
//! Readers run on several worker threads while a writer keeps swapping
//! between two datasets. Every read must see one dataset in full.
//!
//! Run with: `cargo test --test consistency_integration`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use benchfinder::bench::Bench;
use benchfinder::query::NearbyFinder;
use benchfinder::store::{
    deadline_token, BenchStore, BenchStoreConfig, MemoryBackend, StoreError,
};

const CENTER_LAT: f64 = 41.38;
const CENTER_LON: f64 = 2.15;
const DATASET_SIZE: usize = 200;

/// `DATASET_SIZE` benches scattered within roughly 100 m of the center.
fn dataset(prefix: &str) -> Vec<Bench> {
    let mut rng = rand::rng();
    (0..DATASET_SIZE)
        .map(|i| {
            let lon = CENTER_LON + rng.random_range(-0.001..0.001);
            let lat = CENTER_LAT + rng.random_range(-0.0008..0.0008);
            Bench::new(format!("{prefix}-{i:03}"), lon, lat)
        })
        .collect()
}

/// Store keeping every generation written by a test, so retirement never
/// races a slow reader.
fn retaining_store() -> Arc<BenchStore> {
    Arc::new(BenchStore::new(
        Arc::new(MemoryBackend::new()),
        BenchStoreConfig::default().with_retained_generations(16),
    ))
}

/// Prefix shared by every identifier, or `None` if results are mixed.
fn single_prefix<'a>(ids: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut prefixes = ids.map(|id| id.split('-').next().unwrap_or(id).to_string());
    let first = prefixes.next()?;
    prefixes.all(|p| p == first).then_some(first)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_dataset() {
    let store = retaining_store();
    let cancel = CancellationToken::new();
    store.replace_all(dataset("old"), &cancel).await.unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                let mut reads = 0usize;
                while !done.load(Ordering::SeqCst) {
                    let hits = store
                        .nearby_search(CENTER_LAT, CENTER_LON, 500.0, &cancel)
                        .await
                        .unwrap();
                    assert_eq!(hits.len(), DATASET_SIZE, "partial dataset observed");
                    assert!(
                        single_prefix(hits.iter().map(|h| h.gis_id.as_str())).is_some(),
                        "mixed datasets observed"
                    );
                    reads += 1;
                    tokio::task::yield_now().await;
                }
                reads
            })
        })
        .collect();

    for round in 0..10 {
        let prefix = if round % 2 == 0 { "new" } else { "old" };
        store.replace_all(dataset(prefix), &cancel).await.unwrap();
    }
    done.store(true, Ordering::SeqCst);

    let reads: usize = join_all(readers)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .sum();
    assert!(reads > 0);
    assert_eq!(store.active_generation(&cancel).await.unwrap(), Some(11));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_resolve_against_one_generation() {
    let store = retaining_store();
    let cancel = CancellationToken::new();
    store.replace_all(dataset("old"), &cancel).await.unwrap();

    let finder = NearbyFinder::with_radius(Arc::clone(&store), 500.0);
    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            for round in 0..5 {
                let prefix = if round % 2 == 0 { "new" } else { "old" };
                store.replace_all(dataset(prefix), &cancel).await.unwrap();
            }
        })
    };

    let queries = (0..20).map(|_| {
        let finder = finder.clone();
        async move {
            let result = finder
                .find(CENTER_LAT, CENTER_LON, &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(result.len(), DATASET_SIZE);
            assert!(result.unresolved.is_empty());
            let ids = result.benches.iter().map(|b| b.bench.gis_id.as_str());
            assert!(single_prefix(ids).is_some());
        }
    });
    join_all(queries).await;
    writer.await.unwrap();
}

/// Default retention, one replace racing resolving readers. The swap also
/// retires the oldest generation while readers are pinned to the previous one.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_default_retention_serves_readers_during_replace() {
    let store = Arc::new(BenchStore::with_defaults(Arc::new(MemoryBackend::new())));
    let cancel = CancellationToken::new();
    store.replace_all(dataset("first"), &cancel).await.unwrap();
    store.replace_all(dataset("old"), &cancel).await.unwrap();

    let finder = NearbyFinder::with_radius(Arc::clone(&store), 500.0);
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let finder = finder.clone();
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                let cancel = CancellationToken::new();
                let mut reads = 0usize;
                loop {
                    let finished = done.load(Ordering::SeqCst);
                    let result = finder
                        .find(CENTER_LAT, CENTER_LON, &cancel)
                        .await
                        .unwrap();
                    assert_eq!(result.len(), DATASET_SIZE, "partial dataset observed");
                    assert!(result.unresolved.is_empty(), "unresolved records observed");
                    let ids = result.benches.iter().map(|b| b.bench.gis_id.as_str());
                    let prefix = single_prefix(ids);
                    assert!(matches!(prefix.as_deref(), Some("old" | "new")));
                    reads += 1;
                    if finished {
                        break reads;
                    }
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let summary = store.replace_all(dataset("new"), &cancel).await.unwrap();
    done.store(true, Ordering::SeqCst);
    assert_eq!(summary.generation, 3);
    assert_eq!(summary.retired_generations, vec![1]);

    let reads: usize = join_all(readers)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .sum();
    assert!(reads >= 8);

    let result = finder.find(CENTER_LAT, CENTER_LON, &cancel).await.unwrap();
    let ids = result.benches.iter().map(|b| b.bench.gis_id.as_str());
    assert_eq!(single_prefix(ids), Some("new".to_string()));
}

#[tokio::test]
async fn test_writers_are_serialized() {
    let store = Arc::new(BenchStore::with_defaults(Arc::new(MemoryBackend::new())));

    let writes = (0..6).map(|i| {
        let store = Arc::clone(&store);
        async move {
            let bench = Bench::new(format!("w{i}-001"), CENTER_LON, CENTER_LAT);
            store
                .replace_all(vec![bench], &CancellationToken::new())
                .await
                .unwrap()
        }
    });
    let mut generations: Vec<u64> = join_all(writes)
        .await
        .into_iter()
        .map(|summary| summary.generation)
        .collect();
    generations.sort_unstable();

    assert_eq!(generations, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn test_expired_deadline_cancels_replace() {
    let store = Arc::new(BenchStore::with_defaults(Arc::new(MemoryBackend::new())));
    let cancel = CancellationToken::new();
    store.replace_all(dataset("old"), &cancel).await.unwrap();

    let expired = deadline_token(&cancel, Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(expired.is_cancelled());

    let err = store.replace_all(dataset("new"), &expired).await.unwrap_err();
    assert!(matches!(err, StoreError::Cancelled));

    let hits = store
        .nearby_search(CENTER_LAT, CENTER_LON, 500.0, &cancel)
        .await
        .unwrap();
    let ids = hits.iter().map(|h| h.gis_id.as_str());
    assert_eq!(single_prefix(ids), Some("old".to_string()));
}
