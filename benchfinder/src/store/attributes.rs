//! Attribute table: identifier to the full bench record.
//!
//! Each bench is one hash in the backend keyed `<namespace>:<gis_id>`.

use std::sync::Arc;

use crate::bench::Bench;
use crate::store::backend::StoreBackend;
use crate::store::StoreError;

/// Attribute table bound to one key namespace.
#[derive(Clone)]
pub(crate) struct AttributeTable {
    backend: Arc<dyn StoreBackend>,
    namespace: String,
}

impl AttributeTable {
    pub fn new(backend: Arc<dyn StoreBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    fn record_key(&self, gis_id: &str) -> String {
        format!("{}:{}", self.namespace, gis_id)
    }

    /// Inserts or overwrites the records of the given benches.
    pub async fn upsert_all(&self, benches: &[Bench]) -> Result<(), StoreError> {
        let entries = benches
            .iter()
            .map(|bench| (self.record_key(&bench.gis_id), bench.to_attributes()))
            .collect();

        self.backend.hash_set_many(entries).await?;
        Ok(())
    }

    /// Removes every record under the namespace.
    pub async fn remove_all(&self) -> Result<usize, StoreError> {
        let prefix = format!("{}:", self.namespace);
        Ok(self.backend.delete_prefix(&prefix).await?)
    }

    /// Fetches the record for `gis_id`.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no record exists.
    pub async fn get(&self, gis_id: &str) -> Result<Bench, StoreError> {
        match self.backend.hash_get_all(&self.record_key(gis_id)).await? {
            Some(attrs) if !attrs.is_empty() => Ok(Bench::from_attributes(gis_id, attrs)),
            _ => Err(StoreError::NotFound(gis_id.to_string())),
        }
    }
}
