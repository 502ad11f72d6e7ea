//! A thin orchestration layer over an external `oras`-compatible binary.
//! Every invocation is logged with credentials redacted; no HTTP is done
//! directly by this crate.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::RegistryError;
use crate::process::Subprocess;
use crate::signal::CancelFlag;
use crate::store::record::UenvRecord;

use super::creds::Credentials;
use super::progress::{PullProgress, ProgressSender};
use super::redact::redact_arguments;

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    manifests: Vec<DiscoverManifest>,
}

#[derive(Debug, Deserialize)]
struct DiscoverManifest {
    digest: String,
}

pub struct RegistryClient {
    oras_path: String,
}

impl RegistryClient {
    /// Resolves the `oras` binary from `PATH`.
    pub fn discover_binary() -> Result<RegistryClient, RegistryError> {
        let path = which::which("oras").map_err(|_| RegistryError::OrasNotFound)?;
        Ok(RegistryClient {
            oras_path: path.display().to_string(),
        })
    }

    pub fn with_binary_path(path: impl Into<String>) -> RegistryClient {
        RegistryClient {
            oras_path: path.into(),
        }
    }

    fn address(registry: &str, nspace: &str, record: &UenvRecord) -> String {
        format!(
            "{}/{}/{}/{}/{}/{}:{}",
            registry, nspace, record.system, record.uarch, record.name, record.version, record.tag
        )
    }

    fn append_creds(args: &mut Vec<String>, creds: &Option<Credentials>) {
        if let Some(c) = creds {
            args.push("--password".to_string());
            args.push(c.token.clone());
            args.push("--username".to_string());
            args.push(c.username.clone());
        }
    }

    async fn run(&self, command: &str, args: Vec<String>) -> Result<(i32, String, String), RegistryError> {
        let mut full_args = vec![command.to_string()];
        full_args.extend(args);

        log::trace!("run_oras: {}", redact_arguments(&full_args).join(" "));

        let proc = Subprocess::spawn(&self.oras_path, &full_args)?;
        let out = proc.wait_with_output().await?;
        Ok((out.code, out.stdout, out.stderr))
    }

    /// `discover(registry, namespace, record, creds?) -> [digest]`
    pub async fn discover(
        &self,
        registry: &str,
        nspace: &str,
        record: &UenvRecord,
        creds: &Option<Credentials>,
    ) -> Result<Vec<String>, RegistryError> {
        let address = Self::address(registry, nspace, record);
        let mut args = vec![
            "--format".to_string(),
            "json".to_string(),
            "--artifact-type".to_string(),
            "uenv/meta".to_string(),
            address,
        ];
        Self::append_creds(&mut args, creds);

        let (code, stdout, stderr) = self.run("discover", args).await?;
        if code != 0 {
            log::error!("oras discover {}: {}", code, stderr);
            return Err(RegistryError::ChildFailed {
                command: "discover".to_string(),
                code,
                stderr,
            });
        }

        let parsed: DiscoverResponse = serde_json::from_str(&stdout)?;
        Ok(parsed.manifests.into_iter().map(|m| m.digest).collect())
    }

    /// `pull_digest(registry, namespace, record, digest, destination, creds?)`
    pub async fn pull_digest(
        &self,
        registry: &str,
        nspace: &str,
        record: &UenvRecord,
        digest: &str,
        destination: &Path,
        creds: &Option<Credentials>,
    ) -> Result<(), RegistryError> {
        let address = format!(
            "{}/{}/{}/{}/{}/{}@{}",
            registry, nspace, record.system, record.uarch, record.name, record.version, digest
        );
        log::debug!("oras::pull_digest: {}", address);

        let mut args = vec![
            "--output".to_string(),
            destination.display().to_string(),
            address,
        ];
        Self::append_creds(&mut args, creds);

        let (code, _stdout, stderr) = self.run("pull", args).await?;
        if code != 0 {
            log::error!("unable to pull digest with oras: {}", stderr);
            return Err(RegistryError::ChildFailed {
                command: "pull".to_string(),
                code,
                stderr,
            });
        }
        Ok(())
    }

    /// `pull_tag(registry, namespace, record, destination, creds?)`, polling
    /// `destination/store.squashfs`'s size every 100ms and reporting it on
    /// `progress`. Returns `Err(RegistryError::Cancelled)` if `cancel` is
    /// raised mid-download; the caller is responsible for cleaning up the
    /// partial directory and re-raising the signal.
    pub async fn pull_tag(
        &self,
        registry: &str,
        nspace: &str,
        record: &UenvRecord,
        destination: &Path,
        creds: &Option<Credentials>,
        cancel: &CancelFlag,
        progress: Option<&ProgressSender>,
    ) -> Result<(), RegistryError> {
        let address = Self::address(registry, nspace, record);
        log::debug!("oras::pull_tag: {}", address);

        let mut args = vec![
            "pull".to_string(),
            "--concurrency".to_string(),
            "10".to_string(),
            "--output".to_string(),
            destination.display().to_string(),
            address,
        ];
        Self::append_creds(&mut args, creds);

        log::trace!("run_oras: {}", redact_arguments(&args).join(" "));
        let mut proc = Subprocess::spawn(&self.oras_path, &args)?;

        let sqfs = destination.join("store.squashfs");
        let total_mb = record.size_bytes / (1024 * 1024);

        let code = loop {
            if let Some(code) = proc.try_wait()? {
                break code;
            }

            tokio::time::sleep(Duration::from_millis(100)).await;

            if let Some(signal) = cancel.raised() {
                log::warn!("signal raised - interrupting download");
                proc.kill();
                return Err(RegistryError::Cancelled(signal));
            }

            if let Ok(meta) = std::fs::metadata(&sqfs) {
                let downloaded_mb = meta.len() / (1024 * 1024);
                if let Some(tx) = progress {
                    let _ = tx.send(PullProgress { downloaded_mb, total_mb });
                }
            }
        };

        if code != 0 {
            log::error!("unable to pull tag with oras: exit code {}", code);
            return Err(RegistryError::ChildFailed {
                command: "pull".to_string(),
                code,
                stderr: String::new(),
            });
        }

        if let Some(tx) = progress {
            let _ = tx.send(PullProgress { downloaded_mb: total_mb, total_mb });
        }

        Ok(())
    }

    /// `copy(registry, src_ns, src_record, dst_ns, dst_record, creds?)`
    pub async fn copy(
        &self,
        registry: &str,
        src_nspace: &str,
        src_record: &UenvRecord,
        dst_nspace: &str,
        dst_record: &UenvRecord,
        creds: &Option<Credentials>,
    ) -> Result<(), RegistryError> {
        let src_url = Self::address(registry, src_nspace, src_record);
        let dst_url = Self::address(registry, dst_nspace, dst_record);

        let mut args = vec![
            "--concurrency".to_string(),
            "10".to_string(),
            "--recursive".to_string(),
            src_url,
            dst_url,
        ];
        if let Some(c) = creds {
            args.push(format!("--from-password={}", c.token));
            args.push(format!("--from-username={}", c.username));
            args.push(format!("--to-password={}", c.token));
            args.push(format!("--to-username={}", c.username));
        }

        let (code, _stdout, stderr) = self.run("cp", args).await?;
        if code != 0 {
            log::error!("oras cp {}: {}", code, stderr);
            return Err(RegistryError::ChildFailed {
                command: "cp".to_string(),
                code,
                stderr,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::Sha256Digest;

    fn record() -> UenvRecord {
        UenvRecord {
            sha256: Sha256Digest::from_content(b"x"),
            name: "prgenv-gnu".into(),
            version: "24.7".into(),
            tag: "v1".into(),
            system: "santis".into(),
            uarch: "gh200".into(),
            date: None,
            size_bytes: 0,
        }
    }

    #[test]
    fn address_matches_registry_grammar() {
        let addr = RegistryClient::address("jfrog.example.com", "deploy", &record());
        assert_eq!(addr, "jfrog.example.com/deploy/santis/gh200/prgenv-gnu/24.7:v1");
    }
}
