//! Application error types.

use std::fmt;

use crate::refresh::{RefreshError, SourceError};
use crate::store::BackendError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load the dataset snapshot.
    SnapshotRestore(BackendError),

    /// Failed to write the dataset snapshot.
    SnapshotPersist(BackendError),

    /// Failed to create the dataset source.
    SourceCreation(SourceError),

    /// A refresh failed.
    Refresh(RefreshError),

    /// Configuration error.
    Config(String),

    /// A background task panicked or was aborted.
    Task(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::SnapshotRestore(e) => write!(f, "Failed to restore dataset snapshot: {}", e),
            AppError::SnapshotPersist(e) => write!(f, "Failed to persist dataset snapshot: {}", e),
            AppError::SourceCreation(e) => write!(f, "Failed to create dataset source: {}", e),
            AppError::Refresh(e) => write!(f, "Refresh failed: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Task(msg) => write!(f, "Background task failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::SnapshotRestore(e) => Some(e),
            AppError::SnapshotPersist(e) => Some(e),
            AppError::SourceCreation(e) => Some(e),
            AppError::Refresh(e) => Some(e),
            AppError::Config(_) => None,
            AppError::Task(_) => None,
        }
    }
}

impl From<RefreshError> for AppError {
    fn from(e: RefreshError) -> Self {
        AppError::Refresh(e)
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        AppError::SourceCreation(e)
    }
}
