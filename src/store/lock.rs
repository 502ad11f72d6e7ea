//! Advisory file locks guarding the image directory and the index, grounded
//! on a cargo-style RAII guard: the lock is held for the guard's lifetime
//! and released on drop.

use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use crate::errors::RepoError;

pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Blocks until an exclusive lock on `path` (created if absent) is
    /// acquired.
    pub fn acquire_exclusive(path: &Path) -> Result<FileLock, RepoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .map_err(|_| RepoError::LockFailed(path.display().to_string()))?;
        file.lock_exclusive()
            .map_err(|_| RepoError::LockFailed(path.display().to_string()))?;
        Ok(FileLock { file })
    }

    pub fn acquire_shared(path: &Path) -> Result<FileLock, RepoError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .map_err(|_| RepoError::LockFailed(path.display().to_string()))?;
        file.lock_shared()
            .map_err(|_| RepoError::LockFailed(path.display().to_string()))?;
        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.squashfs.lock");
        {
            let _lock = FileLock::acquire_exclusive(&path).unwrap();
        }
        // Lock released on drop; a second acquisition must succeed.
        let _lock2 = FileLock::acquire_exclusive(&path).unwrap();
    }

    #[test]
    fn shared_locks_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db.lock");
        let _a = FileLock::acquire_shared(&path).unwrap();
        let _b = FileLock::acquire_shared(&path).unwrap();
    }
}
