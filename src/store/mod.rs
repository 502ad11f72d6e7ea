//! The repository store: a content-addressed `images/<sha>` tree plus a
//! relational index mapping labels to records.

pub mod index;
pub mod layout;
pub mod lock;
pub mod record;

use std::path::{Path, PathBuf};

use crate::digest::Sha256Digest;
use crate::errors::RepoError;
use crate::parse::UenvLabel;

pub use index::IndexConnection;
pub use layout::{ImagePaths, RepoPaths};
pub use lock::FileLock;
pub use record::{RecordSet, UenvRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

pub struct Repository {
    paths: RepoPaths,
    index: IndexConnection,
    mode: Mode,
}

impl Repository {
    /// Opens the repository rooted at `path`. In `ReadWrite` mode, creates
    /// the directory layout and `index.db` if they don't already exist; in
    /// `ReadOnly` mode, fails unless they already exist.
    pub fn open(path: impl Into<PathBuf>, mode: Mode) -> Result<Repository, RepoError> {
        let root: PathBuf = path.into();
        let paths = RepoPaths::new(root.clone());

        match mode {
            Mode::ReadWrite => {
                std::fs::create_dir_all(paths.images_dir())?;
            }
            Mode::ReadOnly => {
                if !root.is_dir() {
                    return Err(RepoError::NotARepository(root.display().to_string()));
                }
            }
        }

        let index = IndexConnection::open(&paths.index_db())?;

        Ok(Repository { paths, index, mode })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    fn require_writable(&self) -> Result<(), RepoError> {
        if self.mode != Mode::ReadWrite {
            return Err(RepoError::NotWritable(self.paths.root().display().to_string()));
        }
        Ok(())
    }

    /// Returns every record whose non-empty label fields match, per the
    /// wildcard and sha/id-prefix reinterpretation rules of a uenv label.
    pub fn query(&self, label: &UenvLabel) -> Result<RecordSet, RepoError> {
        let _guard = FileLock::acquire_shared(&self.paths.index_lock())?;
        self.query_locked(label)
    }

    /// `query`'s filtering logic, for callers that already hold the
    /// index-wide lock (an exclusive guard on the same file would deadlock
    /// against `query`'s own shared acquisition).
    fn query_locked(&self, label: &UenvLabel) -> Result<RecordSet, RepoError> {
        let all = self.index.all_records()?;

        let records: Vec<UenvRecord> = all
            .into_iter()
            .filter(|r| record_matches(label, r))
            .collect();

        Ok(RecordSet::new(records))
    }

    /// Inserts `record`, failing if its label collides with an existing row
    /// pointing at a different sha256, or if its image directory is
    /// missing.
    pub fn add(&mut self, record: UenvRecord) -> Result<(), RepoError> {
        self.require_writable()?;

        let image = self.paths.image(&record.sha256.full());
        if !image.store.is_dir() {
            return Err(RepoError::MissingImageDirectory(record.sha256.full()));
        }

        let _index_guard = FileLock::acquire_exclusive(&self.paths.index_lock())?;
        self.index.insert(&record)
    }

    /// Removes every row referencing `sha`, and the image directory itself
    /// if nothing else still references it (see DESIGN.md for why: the
    /// reference implementation leaves `image remove` unimplemented).
    pub fn remove(&mut self, sha: &Sha256Digest) -> Result<(), RepoError> {
        self.require_writable()?;

        let _guard = FileLock::acquire_exclusive(&self.paths.image(&sha.full()).lock)?;
        let _index_guard = FileLock::acquire_exclusive(&self.paths.index_lock())?;

        self.index.delete_by_sha(sha)?;

        if !self.index.sha_referenced(sha)? {
            let image = self.paths.image(&sha.full());
            if image.store.is_dir() {
                std::fs::remove_dir_all(&image.store)?;
            }
        }

        Ok(())
    }

    /// Removes just the rows matching one label (leaving the sha directory
    /// if other labels still reference it, matching `add`'s "same sha, many
    /// labels" invariant).
    pub fn remove_label(
        &mut self,
        name: &str,
        version: &str,
        tag: &str,
        system: &str,
        uarch: &str,
    ) -> Result<(), RepoError> {
        self.require_writable()?;
        let label = UenvLabel {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            tag: Some(tag.to_string()),
            system: Some(system.to_string()),
            uarch: Some(uarch.to_string()),
        };

        let _index_guard = FileLock::acquire_exclusive(&self.paths.index_lock())?;
        let matching = self.query_locked(&label)?;

        self.index.delete_by_label(name, version, tag, system, uarch)?;

        for record in matching.records {
            if !self.index.sha_referenced(&record.sha256)? {
                let image = self.paths.image(&record.sha256.full());
                if image.store.is_dir() {
                    std::fs::remove_dir_all(&image.store)?;
                }
            }
        }
        Ok(())
    }

    pub fn uenv_paths(&self, sha: &Sha256Digest) -> ImagePaths {
        self.paths.image(&sha.full())
    }

    /// A scratch directory for an in-progress download of `sha`; the caller
    /// renames it into `uenv_paths(sha).store` once the download lands, or
    /// removes it on failure.
    pub fn partial_uenv_path(&self, sha: &Sha256Digest) -> PathBuf {
        self.paths.partial_image(&sha.full())
    }

    pub fn lock_for_write(&self, sha: &Sha256Digest) -> Result<FileLock, RepoError> {
        FileLock::acquire_exclusive(&self.paths.image(&sha.full()).lock)
    }
}

fn record_matches(label: &UenvLabel, record: &UenvRecord) -> bool {
    if let Some(name) = &label.name {
        if Sha256Digest::looks_like_full(name) {
            if record.sha256.full() != *name {
                return false;
            }
        } else if Sha256Digest::looks_like_id(name) {
            if !record.sha256.matches_id_prefix(name) {
                return false;
            }
        } else if name != &record.name {
            return false;
        }
    }
    if let Some(v) = &label.version {
        if v != &record.version {
            return false;
        }
    }
    if let Some(t) = &label.tag {
        if t != &record.tag {
            return false;
        }
    }
    if let Some(s) = &label.system {
        if s != "*" && s != &record.system {
            return false;
        }
    }
    if let Some(u) = &label.uarch {
        if u != "*" && u != &record.uarch {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, sha_seed: &str) -> UenvRecord {
        UenvRecord {
            sha256: Sha256Digest::from_content(sha_seed.as_bytes()),
            name: name.to_string(),
            version: "24.7".into(),
            tag: "v1".into(),
            system: "santis".into(),
            uarch: "gh200".into(),
            date: None,
            size_bytes: 1024,
        }
    }

    fn open_rw() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path(), Mode::ReadWrite).unwrap();
        (dir, repo)
    }

    fn make_image_dir(repo: &Repository, sha: &Sha256Digest) {
        let image = repo.uenv_paths(sha);
        std::fs::create_dir_all(&image.store).unwrap();
        std::fs::create_dir_all(&image.meta).unwrap();
    }

    #[test]
    fn add_then_query_finds_record() {
        let (_dir, mut repo) = open_rw();
        let record = sample("prgenv-gnu", "seed-a");
        make_image_dir(&repo, &record.sha256);
        repo.add(record.clone()).unwrap();

        let label = UenvLabel {
            name: Some("prgenv-gnu".to_string()),
            ..Default::default()
        };
        let found = repo.query(&label).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.records[0].sha256, record.sha256);
    }

    #[test]
    fn empty_label_returns_every_row() {
        let (_dir, mut repo) = open_rw();
        let a = sample("a", "seed-a");
        let b = sample("b", "seed-b");
        make_image_dir(&repo, &a.sha256);
        make_image_dir(&repo, &b.sha256);
        repo.add(a).unwrap();
        repo.add(b).unwrap();

        let found = repo.query(&UenvLabel::default()).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn remove_deletes_row_and_directory_when_unreferenced() {
        let (_dir, mut repo) = open_rw();
        let record = sample("prgenv-gnu", "seed-a");
        make_image_dir(&repo, &record.sha256);
        let image_dir = repo.uenv_paths(&record.sha256).store.clone();
        repo.add(record.clone()).unwrap();

        repo.remove(&record.sha256).unwrap();

        let found = repo.query(&UenvLabel::default()).unwrap();
        assert!(found.is_empty());
        assert!(!image_dir.exists());
    }

    #[test]
    fn add_rejects_missing_image_directory() {
        let (_dir, mut repo) = open_rw();
        let record = sample("prgenv-gnu", "seed-a");
        assert!(matches!(repo.add(record), Err(RepoError::MissingImageDirectory(_))));
    }

    #[test]
    fn add_rejects_label_conflict_with_different_sha() {
        let (_dir, mut repo) = open_rw();
        let a = sample("prgenv-gnu", "seed-a");
        make_image_dir(&repo, &a.sha256);
        repo.add(a.clone()).unwrap();

        let mut b = a.clone();
        b.sha256 = Sha256Digest::from_content(b"seed-b");
        make_image_dir(&repo, &b.sha256);
        assert!(matches!(repo.add(b), Err(RepoError::LabelConflict { .. })));
    }

    #[test]
    fn wildcard_system_matches_everything() {
        let (_dir, mut repo) = open_rw();
        let record = sample("prgenv-gnu", "seed-a");
        make_image_dir(&repo, &record.sha256);
        repo.add(record).unwrap();

        let label = UenvLabel {
            name: Some("prgenv-gnu".to_string()),
            system: Some("*".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.query(&label).unwrap().len(), 1);
    }
}
