pub mod add;
pub mod find;
pub mod ls;
pub mod pull;
pub mod remove;
pub mod run;

use std::path::{Path, PathBuf};

use uenv::digest::Sha256Digest;
use uenv::parse::{parse_uenv_label, UenvLabel};
use uenv::{Mode, Repository};

/// Resolves the repository path from the explicit `--repo` flag, falling
/// back to `UENV_REPO_PATH` / the platform default.
pub fn open_repo(repo: Option<&Path>, mode: Mode) -> anyhow::Result<Repository> {
    let path: PathBuf = match repo {
        Some(p) => p.to_path_buf(),
        None => uenv::config::repo_path(|k| std::env::var(k).ok())?,
    };
    Ok(Repository::open(path, mode)?)
}

/// A full sha256 or 16-hex id can't go through the label grammar (both may
/// start with a digit, which the lexer never treats as a name token), so
/// they're matched as a bare `name` field directly.
pub fn label_or_digest(s: &str) -> anyhow::Result<UenvLabel> {
    if Sha256Digest::looks_like_full(s) || Sha256Digest::looks_like_id(s) {
        return Ok(UenvLabel {
            name: Some(s.to_string()),
            ..Default::default()
        });
    }
    Ok(parse_uenv_label(s)?)
}
