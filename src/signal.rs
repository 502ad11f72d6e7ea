//! SIGINT/SIGTERM handling that cooperates with an in-flight pull: a single
//! atomic flag, set by async signal handlers and polled by the progress
//! loop, with the raised signal number threaded through for the eventual
//! `128+N` re-raise.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Shared flag: 0 means "no signal seen", otherwise the signal number that
/// was raised.
#[derive(Clone)]
pub struct CancelFlag(Arc<AtomicI32>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag(Arc::new(AtomicI32::new(0)))
    }

    pub fn raised(&self) -> Option<i32> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            n => Some(n),
        }
    }

    pub fn set(&self, signal: i32) {
        self.0.store(signal, Ordering::SeqCst);
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        CancelFlag::new()
    }
}

/// Installs SIGINT/SIGTERM handlers that set `flag` and returns immediately;
/// the handlers run for the lifetime of the returned task.
pub fn install_catcher(flag: CancelFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = sigint.recv() => flag.set(libc_sigint()),
            _ = sigterm.recv() => flag.set(libc_sigterm()),
        }
    })
}

// Avoids a direct `libc` dependency for two well-known constants.
fn libc_sigint() -> i32 {
    2
}

fn libc_sigterm() -> i32 {
    15
}

/// `128 + signal`, the conventional exit code for death-by-signal.
pub fn exit_code_for_signal(signal: i32) -> i32 {
    128 + signal
}
