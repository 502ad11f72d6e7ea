//! Turns a user's `uenv_args`/`view_args` request into a runnable `Env`:
//! resolved labels, assigned mount keys, and an ordered view list.

use std::collections::HashMap;

use crate::digest::Sha256Digest;
use crate::envvar::EnvVarSet;
use crate::errors::ConcretiseError;
use crate::meta::{load_meta, ImageMeta};
use crate::parse::{parse_uenv_args, parse_view_args, UenvDescription, ViewDescriptor};
use crate::store::{Repository, UenvRecord};

/// One resolved uenv: its record, the path it will be mounted at, and its
/// loaded metadata.
#[derive(Debug, Clone)]
pub struct ConcreteUenv {
    pub record: UenvRecord,
    pub sqfs_path: std::path::PathBuf,
    pub mount_path: String,
    pub meta: ImageMeta,
}

/// A view descriptor bound to the uenv that owns it.
#[derive(Debug, Clone)]
pub struct QualifiedView {
    pub uenv_name: String,
    pub view_name: String,
}

/// The result of concretisation: every resolved uenv keyed by its mount
/// path, plus the view list in user-supplied order.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub uenvs: HashMap<String, ConcreteUenv>,
    pub views: Vec<QualifiedView>,
}

impl Env {
    /// Fold every view's `EnvVarSet` in `self.views` order into one set,
    /// then materialise it against `getenv`.
    pub fn materialise(&self, getenv: impl Fn(&str) -> Option<String>) -> Vec<(String, String)> {
        let mut merged = EnvVarSet::new();
        for qv in &self.views {
            if let Some(u) = self.uenvs.get(&qv.uenv_name) {
                if let Some(view) = u.meta.views.get(&qv.view_name) {
                    merged.merge(&view.envvars);
                }
            }
        }
        merged
            .get_values(getenv)
            .into_iter()
            .map(|s| (s.name, s.value))
            .collect()
    }
}

/// Resolves `uenv_args`/`view_args` against `repo` into a runnable `Env`.
pub fn concretise(
    uenv_args: &str,
    view_args: Option<&str>,
    repo: &Repository,
) -> Result<Env, ConcretiseError> {
    let descriptions = parse_uenv_args(uenv_args)?;

    let mut uenvs: HashMap<String, ConcreteUenv> = HashMap::new();
    let mut seen_mounts = std::collections::HashSet::new();

    for desc in &descriptions {
        let concrete = resolve_description(desc, repo)?;

        if !seen_mounts.insert(concrete.mount_path.clone()) {
            return Err(ConcretiseError::DuplicateMount(concrete.mount_path));
        }
        uenvs.insert(concrete.record.name.clone(), concrete);
    }

    let views = match view_args {
        Some(v) if !v.trim().is_empty() => resolve_views(&parse_view_args(v)?, &uenvs)?,
        _ => Vec::new(),
    };

    Ok(Env { uenvs, views })
}

fn resolve_description(
    desc: &UenvDescription,
    repo: &Repository,
) -> Result<ConcreteUenv, ConcretiseError> {
    match desc {
        UenvDescription::Label { label, mount } => {
            let matches = repo.query(label)?;
            if matches.is_empty() {
                return Err(ConcretiseError::NoMatch(label.to_string()));
            }
            if matches.len() > 1 {
                return Err(ConcretiseError::AmbiguousMatch(label.to_string()));
            }
            let record = matches.records.into_iter().next().unwrap();
            let paths = repo.uenv_paths(&record.sha256);
            let meta = load_meta(&paths.meta)?;

            let mount_path = mount
                .clone()
                .or_else(|| meta.mount_path.clone())
                .unwrap_or_else(|| format!("/user-environment/{}", record.name));

            Ok(ConcreteUenv {
                record,
                sqfs_path: paths.store,
                mount_path,
                meta,
            })
        }
        UenvDescription::File { filename, mount } => {
            let file = std::path::Path::new(filename);
            if !file.is_file() {
                return Err(ConcretiseError::NotASquashfs(filename.clone()));
            }
            let bytes = std::fs::read(file).map_err(|e| ConcretiseError::Repo(e.into()))?;
            let sha256 = Sha256Digest::from_content(&bytes);

            let record = UenvRecord {
                sha256,
                name: file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| filename.clone()),
                version: String::new(),
                tag: String::new(),
                system: String::new(),
                uarch: String::new(),
                date: None,
                size_bytes: bytes.len() as u64,
            };

            let mount_path = mount
                .clone()
                .unwrap_or_else(|| format!("/user-environment/{}", record.name));

            Ok(ConcreteUenv {
                meta: ImageMeta {
                    name: record.name.clone(),
                    description: None,
                    mount_path: None,
                    views: HashMap::new(),
                },
                sqfs_path: file.to_path_buf(),
                mount_path,
                record,
            })
        }
    }
}

fn resolve_views(
    descriptors: &[ViewDescriptor],
    uenvs: &HashMap<String, ConcreteUenv>,
) -> Result<Vec<QualifiedView>, ConcretiseError> {
    let mut out = Vec::with_capacity(descriptors.len());

    for d in descriptors {
        let uenv_name = match &d.uenv {
            Some(name) => {
                let uenv = uenvs
                    .get(name)
                    .ok_or_else(|| ConcretiseError::UnknownView(d.to_string()))?;
                if !uenv.meta.views.contains_key(&d.name) {
                    return Err(ConcretiseError::UnknownView(d.to_string()));
                }
                name.clone()
            }
            None => {
                let candidates: Vec<&String> = uenvs
                    .iter()
                    .filter(|(_, u)| u.meta.views.contains_key(&d.name))
                    .map(|(name, _)| name)
                    .collect();
                match candidates.len() {
                    0 => return Err(ConcretiseError::UnknownView(d.to_string())),
                    1 => candidates[0].clone(),
                    _ => return Err(ConcretiseError::AmbiguousView(d.to_string())),
                }
            }
        };

        out.push(QualifiedView {
            uenv_name,
            view_name: d.name.clone(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::ConcreteView;

    fn view_set(value: &str) -> EnvVarSet {
        let mut set = EnvVarSet::new();
        set.update_scalar("CC", value);
        set
    }

    fn uenv(name: &str, mount: &str, view_name: &str, value: &str) -> ConcreteUenv {
        let mut views = HashMap::new();
        views.insert(
            view_name.to_string(),
            ConcreteView {
                name: view_name.to_string(),
                description: String::new(),
                envvars: view_set(value),
            },
        );
        ConcreteUenv {
            record: UenvRecord {
                sha256: Sha256Digest::from_content(name.as_bytes()),
                name: name.to_string(),
                version: "1".into(),
                tag: "v1".into(),
                system: "santis".into(),
                uarch: "gh200".into(),
                date: None,
                size_bytes: 0,
            },
            sqfs_path: std::path::PathBuf::from("/tmp/x"),
            mount_path: mount.to_string(),
            meta: ImageMeta {
                name: name.to_string(),
                description: None,
                mount_path: Some(mount.to_string()),
                views,
            },
        }
    }

    #[test]
    fn materialise_applies_views_in_order() {
        let mut uenvs = HashMap::new();
        uenvs.insert("a".to_string(), uenv("a", "/a", "default", "gcc"));
        uenvs.insert("b".to_string(), uenv("b", "/b", "default", "clang"));

        let env = Env {
            uenvs,
            views: vec![
                QualifiedView { uenv_name: "a".into(), view_name: "default".into() },
                QualifiedView { uenv_name: "b".into(), view_name: "default".into() },
            ],
        };

        let values = env.materialise(|_| None);
        let cc = values.iter().find(|(n, _)| n == "CC").unwrap();
        assert_eq!(cc.1, "clang");
    }

    #[test]
    fn resolve_views_unqualified_requires_uniqueness() {
        let mut uenvs = HashMap::new();
        uenvs.insert("a".to_string(), uenv("a", "/a", "default", "gcc"));
        uenvs.insert("b".to_string(), uenv("b", "/b", "default", "clang"));

        let descriptors = parse_view_args("default").unwrap();
        let result = resolve_views(&descriptors, &uenvs);
        assert!(matches!(result, Err(ConcretiseError::AmbiguousView(_))));
    }

    #[test]
    fn resolve_views_qualified_picks_named_uenv() {
        let mut uenvs = HashMap::new();
        uenvs.insert("a".to_string(), uenv("a", "/a", "default", "gcc"));
        uenvs.insert("b".to_string(), uenv("b", "/b", "default", "clang"));

        let descriptors = parse_view_args("a:default").unwrap();
        let resolved = resolve_views(&descriptors, &uenvs).unwrap();
        assert_eq!(resolved[0].uenv_name, "a");
    }
}
