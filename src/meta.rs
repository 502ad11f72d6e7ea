//! Loads `meta/env.json` from an unpacked image directory into a view
//! catalog.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::envvar::{EnvVarSet, PrefixPathUpdate, UpdateKind};
use crate::errors::MetaError;

#[derive(Debug, Clone)]
pub struct ConcreteView {
    pub name: String,
    pub description: String,
    pub envvars: EnvVarSet,
}

#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub name: String,
    pub description: Option<String>,
    pub mount_path: Option<String>,
    pub views: HashMap<String, ConcreteView>,
}

#[derive(Debug, Deserialize, Default)]
struct RawMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    mount: Option<String>,
    #[serde(default)]
    views: HashMap<String, RawView>,
}

#[derive(Debug, Deserialize, Default)]
struct RawView {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    env: RawEnv,
}

#[derive(Debug, Deserialize, Default)]
struct RawEnv {
    #[serde(default)]
    values: RawEnvValues,
}

#[derive(Debug, Deserialize, Default)]
struct RawEnvValues {
    #[serde(default)]
    list: HashMap<String, Vec<RawUpdate>>,
    #[serde(default)]
    scalar: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default = "default_op")]
    op: RawOp,
    value: Vec<String>,
}

fn default_op() -> RawOp {
    RawOp::Set
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawOp {
    Set,
    Append,
    Prepend,
    #[serde(other)]
    Unknown,
}

impl From<RawOp> for UpdateKind {
    fn from(op: RawOp) -> Self {
        match op {
            RawOp::Append => UpdateKind::Append,
            RawOp::Prepend => UpdateKind::Prepend,
            RawOp::Set | RawOp::Unknown => UpdateKind::Set,
        }
    }
}

/// Parse previously-loaded JSON text into `ImageMeta`. `path` is used only
/// for error messages.
pub fn parse_meta(path: &str, text: &str) -> Result<ImageMeta, MetaError> {
    let raw: RawMeta = serde_json::from_str(text).map_err(|source| MetaError::Json {
        path: path.to_string(),
        source,
    })?;

    let name = raw.name.unwrap_or_else(|| "unnamed".to_string());

    let mut views = HashMap::new();
    for (view_name, raw_view) in raw.views {
        let mut envvars = EnvVarSet::new();
        for (var_name, updates) in raw_view.env.values.list {
            for u in updates {
                envvars.update_prefix_path(
                    &var_name,
                    PrefixPathUpdate {
                        op: u.op.into(),
                        values: u.value,
                    },
                );
            }
        }
        for (var_name, value) in raw_view.env.values.scalar {
            envvars.update_scalar(&var_name, &value);
        }
        views.insert(
            view_name.clone(),
            ConcreteView {
                name: view_name,
                description: raw_view.description.unwrap_or_default(),
                envvars,
            },
        );
    }

    Ok(ImageMeta {
        name,
        description: raw.description,
        mount_path: raw.mount,
        views,
    })
}

/// Reads and parses `<image_dir>/meta/env.json`.
pub fn load_meta(image_meta_dir: &Path) -> Result<ImageMeta, MetaError> {
    let file = image_meta_dir.join("env.json");
    let path_str = file.display().to_string();

    if !file.is_file() {
        return Err(MetaError::NotFound(path_str));
    }

    let text = std::fs::read_to_string(&file).map_err(|source| MetaError::Io {
        path: path_str.clone(),
        source,
    })?;

    parse_meta(&path_str, &text)
}
