//! Core traits for the storage backend.
//!
//! The `StoreBackend` trait is the narrow key-value and geo interface the
//! bench store is written against. It mirrors what a Redis-like server
//! offers (geo sets, string-keyed hashes, plain strings) so a networked
//! provider can be slotted in next to the in-memory one.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable for debugging, namespaced by the caller
//! - **Bulk writes**: One call per batch, matching pipelined server writes
//! - **Single-key atomicity**: Each call on one key is atomic; nothing spans keys
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::geo::GeoPoint;

/// Errors raised by a storage backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend could not be reached or refused the operation.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A key holds a value of a different kind than the operation expects.
    #[error("Key '{key}' holds a {actual} value, expected {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Snapshot persistence failed.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One member of a geo set.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMember {
    pub name: String,
    pub point: GeoPoint,
}

/// A geo set member returned by a radius scan, with its distance from the
/// scan center in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    pub name: String,
    pub point: GeoPoint,
    pub distance_m: f64,
}

/// Key-value and geo storage used by the bench store.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
///
/// # Ordering
///
/// `geo_radius` makes no ordering promise; callers sort the hits.
pub trait StoreBackend: Send + Sync {
    /// Adds or moves members of the geo set at `key`, creating it if needed.
    ///
    /// Returns the number of members newly added.
    fn geo_add(
        &self,
        key: &str,
        members: Vec<GeoMember>,
    ) -> BoxFuture<'_, Result<usize, BackendError>>;

    /// Returns members of the geo set at `key` within `radius_m` meters of
    /// `center`. A missing key yields no hits.
    fn geo_radius(
        &self,
        key: &str,
        center: GeoPoint,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<GeoHit>, BackendError>>;

    /// Writes many hashes at once. Fields of an existing hash not present in
    /// the new value are kept, as with `HSET`.
    fn hash_set_many(
        &self,
        entries: Vec<(String, HashMap<String, String>)>,
    ) -> BoxFuture<'_, Result<(), BackendError>>;

    /// Returns every field of the hash at `key`, or `None` if it is absent.
    fn hash_get_all(
        &self,
        key: &str,
    ) -> BoxFuture<'_, Result<Option<HashMap<String, String>>, BackendError>>;

    /// Reads a plain string value.
    fn get_string(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, BackendError>>;

    /// Writes a plain string value, replacing whatever `key` held.
    fn set_string(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), BackendError>>;

    /// Deletes `key`. Returns `true` if it existed.
    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, BackendError>>;

    /// Deletes every key starting with `prefix`. Returns how many went away.
    fn delete_prefix(&self, prefix: &str) -> BoxFuture<'_, Result<usize, BackendError>>;

    /// Number of keys currently held.
    fn key_count(&self) -> usize;
}
