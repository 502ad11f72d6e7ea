//! Pull progress reporting: `RegistryClient::pull_tag` emits one update
//! roughly every 100ms over this channel's sender half; the CLI's
//! `indicatif` bar consumes the receiver.

#[derive(Debug, Clone, Copy)]
pub struct PullProgress {
    pub downloaded_mb: u64,
    pub total_mb: u64,
}

pub type ProgressSender = tokio::sync::mpsc::UnboundedSender<PullProgress>;
pub type ProgressReceiver = tokio::sync::mpsc::UnboundedReceiver<PullProgress>;

pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
