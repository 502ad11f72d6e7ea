//! `run [--view=<view-list>] <uenv-list> -- <cmd> <args...>`

use clap::Args;
use uenv::envvar::forwarding_prefix;
use uenv::{concretise, Mode};

use super::open_repo;

#[derive(Args)]
pub struct RunArgs {
    /// Comma-separated list of views to activate, each `[uenv:]name`.
    #[arg(long)]
    view: Option<String>,

    /// Comma-separated list of uenvs/squashfs paths, each with an optional
    /// `:mount` suffix.
    uenvs: String,

    /// The command (and its arguments) to execute inside the environment.
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

pub fn run(args: RunArgs, repo_path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let repo = open_repo(repo_path, Mode::ReadOnly)?;

    let env = concretise(&args.uenvs, args.view.as_deref(), &repo)?;

    let materialised = env.materialise(|name| std::env::var(name).ok());

    let prefix = forwarding_prefix();
    let mut command = std::process::Command::new(&args.command[0]);
    command.args(&args.command[1..]);
    for (name, value) in &materialised {
        command.env(format!("{}{}", prefix, name), value);
    }

    let status = command.status()?;
    std::process::exit(status.code().unwrap_or(1));
}
