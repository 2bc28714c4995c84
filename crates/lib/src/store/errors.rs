//! Error types for the record store.

use std::path::PathBuf;

use thiserror::Error;

use crate::Error;

/// Errors that can occur while loading or appending records.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The location string could not be resolved to a storage root.
    #[error("Invalid location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    /// A record file or the storage root could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another writer holds the lock on a record file.
    #[error("{} is locked by another writer: {source}", path.display())]
    LockUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted record could not be decoded.
    #[error("Malformed record in {} at line {line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The CSV layer rejected a record file or a record being written.
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl StoreError {
    /// Check if this error is an I/O failure, lock contention included.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            StoreError::Io { .. } | StoreError::LockUnavailable { .. }
        )
    }

    /// Check if this error indicates corrupt persisted data.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, StoreError::Parse { .. } | StoreError::Csv { .. })
    }

    /// Check if this error is lock contention with another writer.
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, StoreError::LockUnavailable { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}
