//! `image find [label] [-n <namespace>] [--no-header]`
//!
//! Unlike `ls`, which queries the local repository, `find` asks the
//! registry what it has, via `oras discover` against the search term.

use clap::Args;
use uenv::config::current_system_name;
use uenv::registry::RegistryClient;
use uenv::store::UenvRecord;
use uenv::Sha256Digest;

use super::label_or_digest;

#[derive(Args)]
pub struct FindArgs {
    /// Search term: a uenv label, all fields optional.
    uenv: Option<String>,

    #[arg(short, long, default_value = "deploy")]
    namespace: String,

    #[arg(long)]
    no_header: bool,
}

pub async fn run(args: FindArgs, _repo: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut label = match &args.uenv {
        Some(s) => label_or_digest(s)?,
        None => Default::default(),
    };
    if label.system.is_none() {
        label.system = current_system_name(|k| std::env::var(k).ok());
    }

    let registry = std::env::var("UENV_REGISTRY")
        .map_err(|_| anyhow::anyhow!("no registry configured: set UENV_REGISTRY"))?;

    let client = RegistryClient::discover_binary()?;

    let probe = UenvRecord {
        sha256: Sha256Digest::from_content(b""),
        name: label.name.clone().unwrap_or_else(|| "*".to_string()),
        version: label.version.clone().unwrap_or_else(|| "*".to_string()),
        tag: label.tag.clone().unwrap_or_else(|| "*".to_string()),
        system: label.system.clone().unwrap_or_else(|| "*".to_string()),
        uarch: label.uarch.clone().unwrap_or_else(|| "*".to_string()),
        date: None,
        size_bytes: 0,
    };

    let digests = client.discover(&registry, &args.namespace, &probe, &None).await?;

    if !args.no_header && !digests.is_empty() {
        println!("{:<30} {:<10} {:<10} {}", "uenv/version:tag", "uarch", "system", "digest");
    }
    for d in digests {
        println!(
            "{:<30} {:<10} {:<10} {}",
            format!("{}/{}:{}", probe.name, probe.version, probe.tag),
            probe.uarch,
            probe.system,
            d
        );
    }
    Ok(())
}
