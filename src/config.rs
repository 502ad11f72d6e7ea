//! Configuration file and environment-variable resolution: the default
//! repository path, additional read-only repos, and the current system
//! (cluster) name.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    uenv_local_repos: Vec<String>,
}

/// A loaded configuration file: the ordered list of additional read-only
/// repositories, each opened per `spec.md` §6.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub local_repos: Vec<PathBuf>,
}

/// Parses previously-read TOML text. `path` is used only for error
/// messages.
pub fn parse_config(path: &str, text: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
        path: path.to_string(),
        source,
    })?;
    Ok(Config {
        local_repos: raw.uenv_local_repos.into_iter().map(PathBuf::from).collect(),
    })
}

/// Loads the configuration file at `path`, if it exists; `None` if not.
pub fn load_config(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    let path_str = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path_str.clone(),
        source,
    })?;
    Ok(Some(parse_config(&path_str, &text)?))
}

/// Resolves `UENV_CONFIGURATION_PATH`, falling back to
/// `directories::ProjectDirs`' config directory, matching the fallback
/// ordering the example pack uses for its own config-path resolution.
pub fn configuration_path(getenv: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(p) = getenv("UENV_CONFIGURATION_PATH") {
        return Some(PathBuf::from(p));
    }
    directories::ProjectDirs::from("", "", "uenv").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Resolves `UENV_REPO_PATH`, falling back to `directories::ProjectDirs`'
/// cache directory.
pub fn repo_path(getenv: impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(p) = getenv("UENV_REPO_PATH") {
        return Ok(PathBuf::from(p));
    }
    directories::ProjectDirs::from("", "", "uenv")
        .map(|dirs| dirs.cache_dir().join("repo"))
        .ok_or(ConfigError::NoRepoConfigured)
}

/// The current cluster's name, used to default a label's empty `system`
/// field instead of matching every system.
pub fn current_system_name(getenv: impl Fn(&str) -> Option<String>) -> Option<String> {
    getenv("CLUSTER_NAME")
}
