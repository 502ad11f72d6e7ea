//! `image add <label> <squashfs>`

use std::path::PathBuf;

use clap::Args;
use uenv::digest::Sha256Digest;
use uenv::parse::parse_uenv_label;
use uenv::{Mode, UenvRecord};

use super::open_repo;

#[derive(Args)]
pub struct AddArgs {
    /// A fully-qualified label: name/version:tag@system%uarch.
    label: String,

    /// Path to the squashfs file to register.
    squashfs: PathBuf,
}

pub fn run(args: AddArgs, repo: Option<&std::path::Path>) -> anyhow::Result<()> {
    let label = parse_uenv_label(&args.label)?;
    let name = label
        .name
        .ok_or_else(|| anyhow::anyhow!("'{}' is missing a name", args.label))?;
    let version = label
        .version
        .ok_or_else(|| anyhow::anyhow!("'{}' is missing a version", args.label))?;
    let tag = label.tag.unwrap_or_else(|| "default".to_string());
    let system = label
        .system
        .ok_or_else(|| anyhow::anyhow!("'{}' is missing a system", args.label))?;
    let uarch = label
        .uarch
        .ok_or_else(|| anyhow::anyhow!("'{}' is missing a uarch", args.label))?;

    if !args.squashfs.is_file() {
        anyhow::bail!("'{}' is not a regular file", args.squashfs.display());
    }
    let bytes = std::fs::read(&args.squashfs)?;
    let sha256 = Sha256Digest::from_content(&bytes);

    let mut repo = open_repo(repo, Mode::ReadWrite)?;
    let image = repo.uenv_paths(&sha256);

    if !image.store.is_dir() {
        std::fs::create_dir_all(&image.store)?;
        std::fs::copy(&args.squashfs, &image.squashfs)?;
        std::fs::create_dir_all(&image.meta)?;
    }

    repo.add(UenvRecord {
        sha256,
        name,
        version,
        tag,
        system,
        uarch,
        date: None,
        size_bytes: bytes.len() as u64,
    })?;

    Ok(())
}
