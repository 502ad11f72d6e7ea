//! Thin command-line front-end: each subcommand handler parses its flags,
//! calls into the `uenv` library, and prints the result. No business logic
//! lives here.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uenv::signal::{exit_code_for_signal, install_catcher, CancelFlag};

#[derive(Parser)]
#[command(name = "uenv", version, about = "Content-addressed repository and registry client for user-environment images")]
struct Cli {
    /// Path to the local repository.
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Increase logging verbosity (stackable: warn -> info -> debug -> trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    #[arg(long, global = true)]
    color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect and manage images in a local repository.
    #[command(subcommand)]
    Image(ImageCommand),

    /// Concretise a set of uenvs/views and run a command inside them.
    Run(commands::run::RunArgs),
}

#[derive(Subcommand)]
enum ImageCommand {
    Ls(commands::ls::LsArgs),
    Find(commands::find::FindArgs),
    Add(commands::add::AddArgs),
    Remove(commands::remove::RemoveArgs),
    Pull(commands::pull::PullArgs),
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .init();

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let cancel = CancelFlag::new();
    let _catcher = install_catcher(cancel.clone());

    let result = match cli.command {
        Command::Image(ImageCommand::Ls(args)) => commands::ls::run(args, cli.repo.as_deref()),
        Command::Image(ImageCommand::Find(args)) => {
            commands::find::run(args, cli.repo.as_deref()).await
        }
        Command::Image(ImageCommand::Add(args)) => commands::add::run(args, cli.repo.as_deref()),
        Command::Image(ImageCommand::Remove(args)) => {
            commands::remove::run(args, cli.repo.as_deref())
        }
        Command::Image(ImageCommand::Pull(args)) => {
            commands::pull::run(args, cli.repo.as_deref(), &cancel).await
        }
        Command::Run(args) => commands::run::run(args, cli.repo.as_deref()),
    };

    if let Some(signal) = cancel.raised() {
        std::process::exit(exit_code_for_signal(signal));
    }

    if let Err(err) = result {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
