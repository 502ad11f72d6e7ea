//! `index.db`: a small relational index over repository rows, backed by
//! `rusqlite`. Every `query` runs inside its own (deferred, read-only)
//! transaction, giving callers a consistent snapshot for free.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::digest::Sha256Digest;
use crate::errors::RepoError;
use crate::parse::UenvDate;
use crate::store::record::UenvRecord;

pub struct IndexConnection {
    conn: Connection,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    sha256      TEXT NOT NULL,
    name        TEXT NOT NULL,
    version     TEXT NOT NULL,
    tag         TEXT NOT NULL,
    system      TEXT NOT NULL,
    uarch       TEXT NOT NULL,
    date        TEXT,
    size_bytes  INTEGER NOT NULL,
    UNIQUE(name, version, tag, system, uarch)
);
";

impl IndexConnection {
    pub fn open(path: &Path) -> Result<Self, RepoError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(IndexConnection { conn })
    }

    pub fn open_in_memory() -> Result<Self, RepoError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(IndexConnection { conn })
    }

    /// Inserts `record`. Fails with `LabelConflict` if the label already
    /// points at a different sha256; succeeds idempotently if it points at
    /// the same one.
    pub fn insert(&mut self, record: &UenvRecord) -> Result<(), RepoError> {
        let tx = self.conn.transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT sha256 FROM records WHERE name=?1 AND version=?2 AND tag=?3 AND system=?4 AND uarch=?5",
                params![record.name, record.version, record.tag, record.system, record.uarch],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(sha) if sha == record.sha256.full() => return Ok(()),
            Some(_) => {
                return Err(RepoError::LabelConflict {
                    name: record.name.clone(),
                    version: record.version.clone(),
                    tag: record.tag.clone(),
                    system: record.system.clone(),
                    uarch: record.uarch.clone(),
                })
            }
            None => {}
        }

        tx.execute(
            "INSERT INTO records (sha256, name, version, tag, system, uarch, date, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.sha256.full(),
                record.name,
                record.version,
                record.tag,
                record.system,
                record.uarch,
                record.date.map(|d| format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    d.year, d.month, d.day, d.hour, d.minute, d.second
                )),
                record.size_bytes as i64,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Deletes every row with the given sha256. No-op if absent.
    pub fn delete_by_sha(&mut self, sha: &Sha256Digest) -> Result<(), RepoError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records WHERE sha256=?1", params![sha.full()])?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete_by_label(
        &mut self,
        name: &str,
        version: &str,
        tag: &str,
        system: &str,
        uarch: &str,
    ) -> Result<(), RepoError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM records WHERE name=?1 AND version=?2 AND tag=?3 AND system=?4 AND uarch=?5",
            params![name, version, tag, system, uarch],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// True if any row still references `sha`.
    pub fn sha_referenced(&self, sha: &Sha256Digest) -> Result<bool, RepoError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE sha256=?1",
            params![sha.full()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Returns every row. Filtering by label fields happens in
    /// `Repository::query`, which calls this and then applies the
    /// wildcard/prefix matching rules.
    pub fn all_records(&self) -> Result<Vec<UenvRecord>, RepoError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut stmt = tx.prepare(
            "SELECT sha256, name, version, tag, system, uarch, date, size_bytes FROM records",
        )?;
        let rows = stmt.query_map([], |row| {
            let sha256: String = row.get(0)?;
            let size_bytes: i64 = row.get(7)?;
            Ok((
                sha256,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                size_bytes,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (sha256, name, version, tag, system, uarch, date, size_bytes) = row?;
            out.push(UenvRecord {
                sha256: sha256.parse().map_err(RepoError::Parse)?,
                name,
                version,
                tag,
                system,
                uarch,
                date: date.and_then(|d| crate::parse::parse_uenv_date(&d).ok()),
                size_bytes: size_bytes as u64,
            });
        }
        Ok(out)
    }

    pub fn date_to_string(d: &UenvDate) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            d.year, d.month, d.day, d.hour, d.minute, d.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> UenvRecord {
        UenvRecord {
            sha256: Sha256Digest::from_content(name.as_bytes()),
            name: name.to_string(),
            version: "24.7".into(),
            tag: "v1".into(),
            system: "santis".into(),
            uarch: "gh200".into(),
            date: None,
            size_bytes: 1024,
        }
    }

    #[test]
    fn insert_then_query_all() {
        let mut idx = IndexConnection::open_in_memory().unwrap();
        idx.insert(&sample("prgenv-gnu")).unwrap();
        let all = idx.all_records().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "prgenv-gnu");
    }

    #[test]
    fn duplicate_label_same_sha_is_idempotent() {
        let mut idx = IndexConnection::open_in_memory().unwrap();
        let r = sample("prgenv-gnu");
        idx.insert(&r).unwrap();
        idx.insert(&r).unwrap();
        assert_eq!(idx.all_records().unwrap().len(), 1);
    }

    #[test]
    fn duplicate_label_different_sha_conflicts() {
        let mut idx = IndexConnection::open_in_memory().unwrap();
        idx.insert(&sample("prgenv-gnu")).unwrap();
        let mut other = sample("prgenv-gnu");
        other.sha256 = Sha256Digest::from_content(b"different-bytes");
        assert!(matches!(idx.insert(&other), Err(RepoError::LabelConflict { .. })));
    }

    #[test]
    fn delete_by_sha_removes_all_matching_rows() {
        let mut idx = IndexConnection::open_in_memory().unwrap();
        let r = sample("prgenv-gnu");
        idx.insert(&r).unwrap();
        idx.delete_by_sha(&r.sha256).unwrap();
        assert!(idx.all_records().unwrap().is_empty());
        assert!(!idx.sha_referenced(&r.sha256).unwrap());
    }
}
