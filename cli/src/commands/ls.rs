//! `image ls [label] [--no-header] [--json]`

use clap::Args;
use uenv::config::current_system_name;
use uenv::{Mode, UenvRecord};

use super::{label_or_digest, open_repo};

#[derive(Args)]
pub struct LsArgs {
    /// A label pattern to filter by; matches everything if omitted.
    label: Option<String>,

    #[arg(long)]
    no_header: bool,

    #[arg(long)]
    json: bool,
}

pub fn run(args: LsArgs, repo: Option<&std::path::Path>) -> anyhow::Result<()> {
    let repo = open_repo(repo, Mode::ReadOnly)?;

    let mut label = match &args.label {
        Some(s) => label_or_digest(s)?,
        None => Default::default(),
    };
    if label.system.is_none() {
        label.system = current_system_name(|k| std::env::var(k).ok());
    }

    let mut records = repo.query(&label)?.records;
    records.sort_by(|a, b| (&a.name, &a.version).cmp(&(&b.name, &b.version)));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&records))?);
        return Ok(());
    }

    if !args.no_header && !records.is_empty() {
        println!("{:<30} {:<10} {:<10} {:<16}", "uenv/version:tag", "uarch", "system", "id");
    }
    for r in &records {
        println!(
            "{:<30} {:<10} {:<10} {:<16}",
            format!("{}/{}:{}", r.name, r.version, r.tag),
            r.uarch,
            r.system,
            r.id()
        );
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct JsonRecord {
    name: String,
    version: String,
    tag: String,
    system: String,
    uarch: String,
    sha256: String,
    size_bytes: u64,
}

fn to_json(records: &[UenvRecord]) -> Vec<JsonRecord> {
    records
        .iter()
        .map(|r| JsonRecord {
            name: r.name.clone(),
            version: r.version.clone(),
            tag: r.tag.clone(),
            system: r.system.clone(),
            uarch: r.uarch.clone(),
            sha256: r.sha256.full(),
            size_bytes: r.size_bytes,
        })
        .collect()
}
