//! Scalar and prefix-path environment variable mutations, and the fold that
//! turns them into a flat list of `(name, value)` pairs suitable for
//! `execvpe`.

use std::collections::HashMap;

/// The prefix at which concretised environment mutations are forwarded to
/// the final `exec`, so the downstream mount helper can distinguish them
/// from the rest of the inherited environment.
pub fn forwarding_prefix() -> &'static str {
    "SQFSMNT_FWD_"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Set,
    Append,
    Prepend,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixPathUpdate {
    pub op: UpdateKind,
    pub values: Vec<String>,
}

impl PrefixPathUpdate {
    pub fn apply(&self, path: &mut Vec<String>) {
        match self.op {
            UpdateKind::Set => *path = self.values.clone(),
            UpdateKind::Append => path.extend(self.values.iter().cloned()),
            UpdateKind::Prepend => {
                let mut new = self.values.clone();
                new.append(path);
                *path = new;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixPath {
    updates: Vec<PrefixPathUpdate>,
}

impl PrefixPath {
    pub fn update(&mut self, u: PrefixPathUpdate) {
        self.updates.push(u);
    }

    /// Fold all recorded updates starting from `initial_value`, a
    /// colon-joined string (as would come from `getenv`), producing the
    /// final colon-joined, stably de-duplicated value.
    pub fn get(&self, initial_value: &str) -> String {
        let mut value: Vec<String> = if initial_value.is_empty() {
            Vec::new()
        } else {
            initial_value.split(':').map(|s| s.to_string()).collect()
        };
        for u in &self.updates {
            u.apply(&mut value);
        }
        simplify_prefix_path_list(&value).join(":")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub name: String,
    pub value: String,
}

/// The accumulated scalar and prefix-path mutations for one view (or the
/// merge of several views).
#[derive(Debug, Clone, Default)]
pub struct EnvVarSet {
    scalars: HashMap<String, String>,
    prefix_paths: HashMap<String, PrefixPath>,
}

impl EnvVarSet {
    pub fn new() -> Self {
        EnvVarSet::default()
    }

    /// Sets a scalar value for `name`. Returns `true` if `name` previously
    /// held a prefix-path accumulator (a conflict, evicted by this call).
    pub fn update_scalar(&mut self, name: &str, value: &str) -> bool {
        let conflict = self.prefix_paths.remove(name).is_some();
        self.scalars.insert(name.to_string(), value.to_string());
        conflict
    }

    /// Records a prefix-path update for `name`. Returns `true` if `name`
    /// previously held a scalar value (a conflict, evicted by this call).
    pub fn update_prefix_path(&mut self, name: &str, update: PrefixPathUpdate) -> bool {
        let conflict = self.scalars.remove(name).is_some();
        self.prefix_paths
            .entry(name.to_string())
            .or_insert_with(PrefixPath::default)
            .update(update);
        conflict
    }

    /// Merge `other` into `self`, as if `other`'s updates had been applied
    /// after `self`'s own. Used to fold several views' env var sets in
    /// user-supplied order.
    pub fn merge(&mut self, other: &EnvVarSet) {
        for (name, value) in &other.scalars {
            self.update_scalar(name, value);
        }
        for (name, path) in &other.prefix_paths {
            for u in &path.updates {
                self.update_prefix_path(name, u.clone());
            }
        }
    }

    /// Materialise every scalar and prefix-path into a flat, ordered list
    /// of `(name, value)` pairs. `getenv` supplies the current environment
    /// for prefix-paths that don't start with a `set`.
    pub fn get_values(&self, getenv: impl Fn(&str) -> Option<String>) -> Vec<Scalar> {
        let mut out = Vec::with_capacity(self.scalars.len() + self.prefix_paths.len());

        for (name, value) in &self.scalars {
            out.push(Scalar {
                name: name.clone(),
                value: value.clone(),
            });
        }

        for (name, path) in &self.prefix_paths {
            let initial = getenv(name).unwrap_or_default();
            out.push(Scalar {
                name: name.clone(),
                value: path.get(&initial),
            });
        }

        out
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.prefix_paths.is_empty()
    }
}

/// Remove duplicate entries from `in`, keeping first-occurrence order, and
/// dropping empty strings. Equivalent to `std::unique` over an unsorted
/// list with partial-ordering preserved.
pub fn simplify_prefix_path_list(input: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(input.len());
    for p in input {
        if p.is_empty() {
            continue;
        }
        if seen.insert(p.clone()) {
            out.push(p.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_last_write_wins() {
        let mut set = EnvVarSet::new();
        set.update_scalar("FOO", "1");
        set.update_scalar("FOO", "2");
        let values = set.get_values(|_| None);
        assert_eq!(values, vec![Scalar { name: "FOO".into(), value: "2".into() }]);
    }

    #[test]
    fn prefix_path_set_then_append() {
        let mut set = EnvVarSet::new();
        set.update_prefix_path(
            "PATH",
            PrefixPathUpdate { op: UpdateKind::Set, values: vec!["/a".into()] },
        );
        set.update_prefix_path(
            "PATH",
            PrefixPathUpdate { op: UpdateKind::Append, values: vec!["/b".into()] },
        );
        let values = set.get_values(|_| Some("/x".into()));
        assert_eq!(values[0].value, "/a:/b");
    }

    #[test]
    fn prefix_path_prepend_uses_base_env_without_set() {
        let mut set = EnvVarSet::new();
        set.update_prefix_path(
            "PATH",
            PrefixPathUpdate { op: UpdateKind::Prepend, values: vec!["/new".into()] },
        );
        let values = set.get_values(|_| Some("/old".into()));
        assert_eq!(values[0].value, "/new:/old");
    }

    #[test]
    fn switching_kind_reports_conflict() {
        let mut set = EnvVarSet::new();
        assert!(!set.update_scalar("X", "1"));
        assert!(set.update_prefix_path(
            "X",
            PrefixPathUpdate { op: UpdateKind::Set, values: vec!["/a".into()] }
        ));
        // prefix-path kind now wins.
        let values = set.get_values(|_| None);
        assert_eq!(values[0].value, "/a");

        assert!(set.update_scalar("X", "2"));
        let values = set.get_values(|_| None);
        assert_eq!(values[0].value, "2");
    }

    #[test]
    fn simplify_drops_empty_and_dedups_stably() {
        let input = vec!["/a".to_string(), "".to_string(), "/b".to_string(), "/a".to_string()];
        assert_eq!(simplify_prefix_path_list(&input), vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn merge_applies_in_order() {
        let mut base = EnvVarSet::new();
        base.update_scalar("A", "1");
        let mut overlay = EnvVarSet::new();
        overlay.update_scalar("A", "2");
        base.merge(&overlay);
        let values = base.get_values(|_| None);
        assert_eq!(values[0].value, "2");
    }
}
