//! `image remove <label-or-sha>`

use clap::Args;
use uenv::digest::Sha256Digest;
use uenv::Mode;

use super::{label_or_digest, open_repo};

#[derive(Args)]
pub struct RemoveArgs {
    /// A full sha256 digest, an id prefix, or a label.
    target: String,
}

pub fn run(args: RemoveArgs, repo: Option<&std::path::Path>) -> anyhow::Result<()> {
    let mut repo = open_repo(repo, Mode::ReadWrite)?;

    if Sha256Digest::looks_like_full(&args.target) {
        let sha: Sha256Digest = args.target.parse()?;
        repo.remove(&sha)?;
        return Ok(());
    }

    let label = label_or_digest(&args.target)?;
    let matches = repo.query(&label)?;
    if matches.is_empty() {
        anyhow::bail!("'{}' does not match any uenv in the repository", args.target);
    }

    for record in matches.records {
        repo.remove_label(&record.name, &record.version, &record.tag, &record.system, &record.uarch)?;
    }

    Ok(())
}
