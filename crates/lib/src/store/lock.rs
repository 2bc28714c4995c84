//! Advisory locking of record files shared between processes.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use fs2::FileExt;

use super::StoreError;

/// Exclusive advisory lock on an open record file.
///
/// Acquisition never blocks: contention is reported as
/// [`StoreError::LockUnavailable`]. The lock is released when the guard is
/// dropped, whether or not the write it protected succeeded.
#[derive(Debug)]
pub struct ScopedLock<'a> {
    file: &'a File,
    path: PathBuf,
}

impl<'a> ScopedLock<'a> {
    pub fn try_acquire(file: &'a File, path: &Path) -> Result<Self, StoreError> {
        tracing::debug!(path = %path.display(), "locking record file");
        FileExt::try_lock_exclusive(file).map_err(|source| StoreError::LockUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ScopedLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(self.file) {
            tracing::warn!(path = %self.path.display(), "failed to unlock record file: {e}");
        }
    }
}
