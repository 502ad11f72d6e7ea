//! `image pull <nslabel> [--only-meta] [--force]`

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use uenv::config::current_system_name;
use uenv::parse::parse_uenv_nslabel;
use uenv::registry::{channel, Credentials, RegistryClient};
use uenv::signal::CancelFlag;
use uenv::{Mode, UenvRecord};

use super::open_repo;

#[derive(Args)]
pub struct PullArgs {
    /// A namespace-qualified label: `ns::name/version:tag@system%uarch`.
    nslabel: String,

    /// Only fetch metadata, skip the squashfs payload.
    #[arg(long)]
    only_meta: bool,

    /// Re-download even if a matching record already exists.
    #[arg(long)]
    force: bool,
}

fn credentials() -> Option<Credentials> {
    let username = std::env::var("UENV_AUTH_USERNAME").ok()?;
    let token = std::env::var("UENV_AUTH_TOKEN").ok()?;
    Some(Credentials { username, token })
}

pub async fn run(
    args: PullArgs,
    repo_path: Option<&std::path::Path>,
    cancel: &CancelFlag,
) -> anyhow::Result<()> {
    let mut nslabel = parse_uenv_nslabel(&args.nslabel)?;
    if nslabel.label.system.is_none() {
        nslabel.label.system = current_system_name(|k| std::env::var(k).ok());
    }
    let nspace = nslabel.namespace.clone().unwrap_or_else(|| "deploy".to_string());

    let registry = std::env::var("UENV_REGISTRY")
        .map_err(|_| anyhow::anyhow!("no registry configured: set UENV_REGISTRY"))?;
    let creds = credentials();

    let mut repo = open_repo(repo_path, Mode::ReadWrite)?;

    if !args.force {
        let existing = repo.query(&nslabel.label)?;
        if !existing.is_empty() {
            log::info!("'{}' is already present, skipping download", nslabel.label);
            return Ok(());
        }
    }

    let client = RegistryClient::discover_binary()?;

    let probe = UenvRecord {
        sha256: uenv::digest::Sha256Digest::from_content(b""),
        name: nslabel.label.name.clone().unwrap_or_default(),
        version: nslabel.label.version.clone().unwrap_or_default(),
        tag: nslabel.label.tag.clone().unwrap_or_else(|| "default".to_string()),
        system: nslabel.label.system.clone().unwrap_or_default(),
        uarch: nslabel.label.uarch.clone().unwrap_or_default(),
        date: None,
        size_bytes: 0,
    };

    let digests = client.discover(&registry, &nspace, &probe, &creds).await?;
    let digest = digests
        .first()
        .ok_or_else(|| anyhow::anyhow!("'{}' does not match any uenv in the registry", nslabel))?;

    let sha256: uenv::digest::Sha256Digest = digest
        .trim_start_matches("sha256:")
        .parse()
        .map_err(|_| anyhow::anyhow!("registry returned a malformed digest '{}'", digest))?;

    let paths = repo.uenv_paths(&sha256);
    let _lock = repo.lock_for_write(&sha256)?;

    let result = if args.only_meta {
        std::fs::create_dir_all(&paths.meta)?;
        client.pull_digest(&registry, &nspace, &probe, digest, &paths.meta, &creds).await
    } else {
        // Download into a scratch directory first, renamed into place only
        // once the whole squashfs has landed, so a reader never observes a
        // partially-written `images/<sha>`.
        let partial = repo.partial_uenv_path(&sha256);
        std::fs::remove_dir_all(&partial).ok();
        std::fs::create_dir_all(&partial)?;

        let (tx, mut rx) = channel();
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{bar:25}] {bytes:>9}/{total_bytes:>9}")
                .unwrap(),
        );
        let progress_task = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                bar.set_length(update.total_mb);
                bar.set_position(update.downloaded_mb);
            }
            bar.finish_and_clear();
        });

        let res = client
            .pull_tag(&registry, &nspace, &probe, &partial, &creds, cancel, Some(&tx))
            .await;
        drop(tx);
        let _ = progress_task.await;

        res.and_then(|()| {
            std::fs::remove_dir_all(&paths.store).ok();
            std::fs::rename(&partial, &paths.store).map_err(Into::into)
        })
    };

    if let Err(err) = result {
        std::fs::remove_dir_all(&paths.store).ok();
        std::fs::remove_dir_all(repo.partial_uenv_path(&sha256)).ok();
        return Err(err.into());
    }

    let size_bytes = dir_size(&paths.store).unwrap_or(0);

    repo.add(UenvRecord {
        sha256,
        name: probe.name,
        version: probe.version,
        tag: probe.tag,
        system: probe.system,
        uarch: probe.uarch,
        date: None,
        size_bytes,
    })?;

    Ok(())
}

fn dir_size(path: &std::path::Path) -> std::io::Result<u64> {
    let mut total = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_dir() {
                total += dir_size(&entry.path())?;
            } else {
                total += meta.len();
            }
        }
    }
    Ok(total)
}
