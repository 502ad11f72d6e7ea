use crate::digest::Sha256Digest;
use crate::parse::UenvDate;

/// One row of the repository index: a label bound to a content-addressed
/// image. Immutable after insertion; several rows may share one `sha256`.
#[derive(Debug, Clone, PartialEq)]
pub struct UenvRecord {
    pub sha256: Sha256Digest,
    pub name: String,
    pub version: String,
    pub tag: String,
    pub system: String,
    pub uarch: String,
    pub date: Option<UenvDate>,
    pub size_bytes: u64,
}

impl UenvRecord {
    pub fn id(&self) -> String {
        self.sha256.id()
    }
}

/// An unordered collection of records, e.g. the result of a `query`.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<UenvRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<UenvRecord>) -> Self {
        RecordSet { records }
    }

    /// True if every record in the set shares one `sha256`.
    pub fn unique_sha(&self) -> bool {
        match self.records.split_first() {
            None => true,
            Some((first, rest)) => rest.iter().all(|r| r.sha256 == first.sha256),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, sha: &str) -> UenvRecord {
        UenvRecord {
            sha256: Sha256Digest::from_content(sha.as_bytes()),
            name: name.to_string(),
            version: "1.0".into(),
            tag: "v1".into(),
            system: "santis".into(),
            uarch: "gh200".into(),
            date: None,
            size_bytes: 0,
        }
    }

    #[test]
    fn unique_sha_true_for_empty_and_singleton() {
        assert!(RecordSet::new(vec![]).unique_sha());
        assert!(RecordSet::new(vec![record("a", "x")]).unique_sha());
    }

    #[test]
    fn unique_sha_false_when_shas_differ() {
        let set = RecordSet::new(vec![record("a", "x"), record("b", "y")]);
        assert!(!set.unique_sha());
    }
}
