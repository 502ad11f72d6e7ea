//! OCI-compatible registry access, built entirely by orchestrating an
//! external `oras` binary: we never speak the registry HTTP protocol
//! ourselves.

mod client;
mod creds;
mod progress;
mod redact;

pub use client::RegistryClient;
pub use creds::Credentials;
pub use progress::{channel, PullProgress, ProgressReceiver, ProgressSender};
pub use redact::redact_arguments;
