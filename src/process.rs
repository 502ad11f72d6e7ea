//! Child process primitive: launches a program with argv, wires stdin/
//! stdout/stderr, and exposes both a blocking wait and a poll-driven path
//! for the long-running `oras pull` progress loop.

use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

pub struct Subprocess {
    child: Child,
}

pub struct Output {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Subprocess {
    /// Spawns `program` with `args`, capturing stdout/stderr.
    pub fn spawn(program: &str, args: &[String]) -> std::io::Result<Subprocess> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        Ok(Subprocess { child })
    }

    /// Blocks until the child exits, returning its exit code and captured
    /// output.
    pub async fn wait_with_output(self) -> std::io::Result<Output> {
        let output = self.child.wait_with_output().await?;
        Ok(Output {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Non-blocking check: `Some(code)` once the child has exited.
    pub fn try_wait(&mut self) -> std::io::Result<Option<i32>> {
        Ok(self.child.try_wait()?.map(|s| s.code().unwrap_or(-1)))
    }

    /// Drains and returns whatever is currently buffered on stdout/stderr
    /// without waiting for exit. Used by callers that want to observe
    /// partial output from a still-running child (e.g. for diagnostics).
    pub async fn read_available(&mut self) -> std::io::Result<(String, String)> {
        let mut out = String::new();
        let mut err = String::new();
        if let Some(stdout) = self.child.stdout.as_mut() {
            let mut buf = Vec::new();
            let _ = stdout.read_buf(&mut buf).await;
            out.push_str(&String::from_utf8_lossy(&buf));
        }
        if let Some(stderr) = self.child.stderr.as_mut() {
            let mut buf = Vec::new();
            let _ = stderr.read_buf(&mut buf).await;
            err.push_str(&String::from_utf8_lossy(&buf));
        }
        Ok((out, err))
    }

    pub fn kill(&mut self) {
        let _ = self.child.start_kill();
    }
}
