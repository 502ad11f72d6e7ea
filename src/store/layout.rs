//! On-disk layout helpers: every path the store touches is built here, so
//! there is exactly one place that knows the repository's directory shape.

use std::path::{Path, PathBuf};

/// Paths associated with one content-addressed image directory.
#[derive(Debug, Clone)]
pub struct ImagePaths {
    pub store: PathBuf,
    pub squashfs: PathBuf,
    pub meta: PathBuf,
    pub lock: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RepoPaths {
    root: PathBuf,
}

impl RepoPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RepoPaths { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_db(&self) -> PathBuf {
        self.root.join("index.db")
    }

    /// The index-wide advisory lock, held exclusively by any writer
    /// mutating `index.db` and shared by readers taking a consistent
    /// snapshot of it.
    pub fn index_lock(&self) -> PathBuf {
        self.root.join("index.db.lock")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Builds the paths for one image. `sha` must already be the full
    /// 64-hex digest; the caller is responsible for validating shape.
    pub fn image(&self, sha: &str) -> ImagePaths {
        let store = self.images_dir().join(sha);
        ImagePaths {
            squashfs: store.join("store.squashfs"),
            meta: store.join("meta"),
            lock: store.join("store.squashfs.lock"),
            store,
        }
    }

    /// A scratch directory for an in-progress download of `sha`, renamed
    /// into place atomically once complete.
    pub fn partial_image(&self, sha: &str) -> PathBuf {
        self.images_dir().join(format!(".{}.partial", sha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_paths() {
        let repo = RepoPaths::new("/tmp/repo");
        assert_eq!(repo.index_db(), PathBuf::from("/tmp/repo/index.db"));
        let img = repo.image("deadbeef");
        assert_eq!(img.store, PathBuf::from("/tmp/repo/images/deadbeef"));
        assert_eq!(img.squashfs, PathBuf::from("/tmp/repo/images/deadbeef/store.squashfs"));
        assert_eq!(img.meta, PathBuf::from("/tmp/repo/images/deadbeef/meta"));
        assert_eq!(img.lock, PathBuf::from("/tmp/repo/images/deadbeef/store.squashfs.lock"));
        assert_eq!(repo.index_lock(), PathBuf::from("/tmp/repo/index.db.lock"));
        assert_eq!(
            repo.partial_image("deadbeef"),
            PathBuf::from("/tmp/repo/images/.deadbeef.partial")
        );
    }
}
