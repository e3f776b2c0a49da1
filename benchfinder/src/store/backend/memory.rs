//! In-memory storage backend using dashmap.
//!
//! Every key maps to one typed value (geo set, hash or string). Operations
//! on a single key hold that key's shard lock for their duration, which
//! makes each call atomic with respect to other calls on the same key.
//!
//! # Persistence
//!
//! The whole keyspace can be written to and restored from a bincode
//! snapshot file, so a dataset survives process restarts.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::store::backend::traits::{BackendError, BoxFuture, GeoHit, GeoMember, StoreBackend};

/// A stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Value {
    Geo(HashMap<String, GeoPoint>),
    Hash(HashMap<String, String>),
    Str(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Geo(_) => "geo",
            Value::Hash(_) => "hash",
            Value::Str(_) => "string",
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &Value) -> BackendError {
    BackendError::WrongType {
        key: key.to_string(),
        expected,
        actual: actual.kind(),
    }
}

/// In-memory backend.
///
/// Cheap reads from many tasks at once; writers only contend on the shard
/// that holds their key.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Value>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a backend from a snapshot written by [`MemoryBackend::persist_to`].
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Snapshot` if the file cannot be read or decoded.
    pub fn restore_from(path: &Path) -> Result<Self, BackendError> {
        let file = File::open(path).map_err(|e| {
            BackendError::Snapshot(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let snapshot: BTreeMap<String, Value> = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| {
                BackendError::Snapshot(format!("Failed to decode {}: {}", path.display(), e))
            })?;

        Ok(Self {
            entries: snapshot.into_iter().collect(),
        })
    }

    /// Write every key to a snapshot file.
    ///
    /// The snapshot is written next to `path` and renamed into place, so a
    /// crash mid-write never leaves a truncated snapshot behind.
    pub fn persist_to(&self, path: &Path) -> Result<(), BackendError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BackendError::Snapshot(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let snapshot: BTreeMap<String, Value> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let tmp_path = path.with_extension("tmp");
        let file = File::create(&tmp_path).map_err(|e| {
            BackendError::Snapshot(format!("Failed to create {}: {}", tmp_path.display(), e))
        })?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &snapshot)
            .map_err(|e| BackendError::Snapshot(format!("Failed to encode snapshot: {}", e)))?;
        writer
            .flush()
            .map_err(|e| BackendError::Snapshot(format!("Failed to flush snapshot: {}", e)))?;

        fs::rename(&tmp_path, path).map_err(|e| {
            BackendError::Snapshot(format!("Failed to move snapshot into place: {}", e))
        })
    }
}

impl StoreBackend for MemoryBackend {
    fn geo_add(
        &self,
        key: &str,
        members: Vec<GeoMember>,
    ) -> BoxFuture<'_, Result<usize, BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            if members.is_empty() {
                return Ok(0);
            }

            let mut slot = self
                .entries
                .entry(key.clone())
                .or_insert_with(|| Value::Geo(HashMap::new()));

            match slot.value_mut() {
                Value::Geo(set) => {
                    let mut added = 0;
                    for member in members {
                        if set.insert(member.name, member.point).is_none() {
                            added += 1;
                        }
                    }
                    Ok(added)
                }
                other => Err(wrong_type(&key, "geo", other)),
            }
        })
    }

    fn geo_radius(
        &self,
        key: &str,
        center: GeoPoint,
        radius_m: f64,
    ) -> BoxFuture<'_, Result<Vec<GeoHit>, BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            let Some(slot) = self.entries.get(&key) else {
                return Ok(Vec::new());
            };

            match slot.value() {
                Value::Geo(set) => Ok(set
                    .iter()
                    .filter_map(|(name, point)| {
                        let distance_m = center.distance_m(point);
                        (distance_m <= radius_m).then(|| GeoHit {
                            name: name.clone(),
                            point: *point,
                            distance_m,
                        })
                    })
                    .collect()),
                other => Err(wrong_type(&key, "geo", other)),
            }
        })
    }

    fn hash_set_many(
        &self,
        entries: Vec<(String, HashMap<String, String>)>,
    ) -> BoxFuture<'_, Result<(), BackendError>> {
        Box::pin(async move {
            for (key, fields) in entries {
                let mut slot = self
                    .entries
                    .entry(key.clone())
                    .or_insert_with(|| Value::Hash(HashMap::new()));

                match slot.value_mut() {
                    Value::Hash(hash) => hash.extend(fields),
                    other => return Err(wrong_type(&key, "hash", other)),
                }
            }
            Ok(())
        })
    }

    fn hash_get_all(
        &self,
        key: &str,
    ) -> BoxFuture<'_, Result<Option<HashMap<String, String>>, BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            match self.entries.get(&key) {
                None => Ok(None),
                Some(slot) => match slot.value() {
                    Value::Hash(hash) => Ok(Some(hash.clone())),
                    other => Err(wrong_type(&key, "hash", other)),
                },
            }
        })
    }

    fn get_string(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            match self.entries.get(&key) {
                None => Ok(None),
                Some(slot) => match slot.value() {
                    Value::Str(value) => Ok(Some(value.clone())),
                    other => Err(wrong_type(&key, "string", other)),
                },
            }
        })
    }

    fn set_string(&self, key: &str, value: String) -> BoxFuture<'_, Result<(), BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.entries.insert(key, Value::Str(value));
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, Result<bool, BackendError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.entries.remove(&key).is_some()) })
    }

    fn delete_prefix(&self, prefix: &str) -> BoxFuture<'_, Result<usize, BackendError>> {
        let prefix = prefix.to_string();
        Box::pin(async move {
            let before = self.entries.len();
            self.entries.retain(|key, _| !key.starts_with(&prefix));
            Ok(before.saturating_sub(self.entries.len()))
        })
    }

    fn key_count(&self) -> usize {
        self.entries.len()
    }
}
