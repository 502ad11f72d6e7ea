//! A content-addressed repository and OCI-compatible registry client for
//! user-environment (uenv) images: squashfs images addressed by their
//! sha256, labeled with `name/version:tag@system%uarch`, pulled from an
//! OCI registry via an external `oras` binary, and concretised into a
//! runnable set of mounts and environment variables.

pub mod concretise;
pub mod config;
pub mod digest;
pub mod envvar;
pub mod errors;
pub mod lex;
pub mod meta;
pub mod parse;
pub mod process;
pub mod registry;
pub mod shell;
pub mod signal;
pub mod store;

pub use concretise::{concretise, ConcreteUenv, Env, QualifiedView};
pub use digest::Sha256Digest;
pub use envvar::EnvVarSet;
pub use errors::UenvError;
pub use meta::ImageMeta;
pub use store::{Mode, Repository, UenvRecord};
