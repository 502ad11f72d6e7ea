//! Error types for each subsystem. Each error carries enough of the failing
//! value or path that the CLI can print a single, specific message.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("the uenv metadata file {0} does not exist")]
    NotFound(String),

    #[error("error parsing metadata file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error reading metadata file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("a record with label (name={name}, version={version}, tag={tag}, system={system}, uarch={uarch}) already exists with a different sha256")]
    LabelConflict {
        name: String,
        version: String,
        tag: String,
        system: String,
        uarch: String,
    },

    #[error("image directory for sha256 {0} is missing")]
    MissingImageDirectory(String),

    #[error("repository path {0} is not a valid repository")]
    NotARepository(String),

    #[error("repository path {0} is not writable")]
    NotWritable(String),

    #[error("failed to acquire lock on {0}")]
    LockFailed(String),
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no oras executable found on PATH")]
    OrasNotFound,

    #[error("oras {command} failed with exit code {code}: {stderr}")]
    ChildFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("unable to parse oras discover output: {0}")]
    MalformedDiscoverOutput(#[from] serde_json::Error),

    #[error("io error launching oras: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled by signal {0}")]
    Cancelled(i32),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file {0} does not exist")]
    NotFound(String),

    #[error("malformed configuration file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("io error reading configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no repository configured: set --repo or UENV_REPO_PATH")]
    NoRepoConfigured,
}

#[derive(Error, Debug)]
pub enum ConcretiseError {
    #[error("'{0}' does not match any uenv in the repository")]
    NoMatch(String),

    #[error("'{0}' matches more than one uenv in the repository")]
    AmbiguousMatch(String),

    #[error("mount path '{0}' is used by more than one uenv")]
    DuplicateMount(String),

    #[error("view '{0}' does not match any uenv in this invocation")]
    UnknownView(String),

    #[error("view '{0}' is ambiguous between more than one uenv")]
    AmbiguousView(String),

    #[error("'{0}' is not a regular squashfs file")]
    NotASquashfs(String),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("metadata error: {0}")]
    Meta(#[from] MetaError),
}

#[derive(Error, Debug)]
pub enum UenvError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Meta(#[from] MetaError),

    #[error("{0}")]
    Repo(#[from] RepoError),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Concretise(#[from] ConcretiseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation cancelled by signal {0}")]
    Cancelled(i32),
}
