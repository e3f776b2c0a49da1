//! Storage backends for the bench store.
//!
//! Each backend implements the [`StoreBackend`] trait and is shared by all
//! store callers through an `Arc<dyn StoreBackend>`.
//!
//! # Available Backends
//!
//! - [`MemoryBackend`]: In-process keyspace using dashmap, with snapshot files

mod memory;
mod traits;

pub use memory::MemoryBackend;
pub use traits::{BackendError, BoxFuture, GeoHit, GeoMember, StoreBackend};
