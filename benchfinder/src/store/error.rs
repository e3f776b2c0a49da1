//! Bench store error types.

use thiserror::Error;

use crate::geo::InvalidCoordinate;
use crate::store::backend::BackendError;

/// Errors returned by the bench store and its sub-stores.
///
/// The store never logs; callers decide what to report and whether to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One or more records carry out-of-range coordinates. Every offending
    /// record of the batch is listed; nothing was written.
    #[error("{} record(s) with invalid coordinates, first: {}", .0.len(), first_invalid(.0))]
    InvalidCoordinates(Vec<InvalidCoordinate>),

    /// A record has an empty identifier.
    #[error("Record at position {position} has no identifier")]
    MissingIdentifier { position: usize },

    /// The search radius is negative or not a number.
    #[error("Invalid search radius: {0}")]
    InvalidRadius(f64),

    /// No attribute record exists for the identifier.
    #[error("Bench not found: {0}")]
    NotFound(String),

    /// The active generation pointer holds something that is not a number.
    #[error("Corrupt active generation pointer: '{0}'")]
    CorruptPointer(String),

    /// The storage backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The caller cancelled the operation or its deadline passed.
    #[error("Operation cancelled")]
    Cancelled,
}

fn first_invalid(invalid: &[InvalidCoordinate]) -> String {
    invalid
        .first()
        .map(|c| c.to_string())
        .unwrap_or_default()
}

impl StoreError {
    /// Whether the error concerns a single record and can be skipped when
    /// resolving a batch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
