//! Local IPC transport (Unix domain socket).
//!
//! Exposes the worker-side client that ships encoded deltas and the
//! collector-side server that reads them line by line.

pub mod client;
pub mod server;

use async_trait::async_trait;
use tally_core::MetricDelta;

pub use client::IpcClient;
pub use server::IpcServer;

/// Result of one best-effort delivery attempt.
///
/// Only `Sent` means the bytes reached the socket. Every other outcome means
/// the delta is gone; nothing is queued for retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NoConnection,
    WriteFailed,
    EncodeFailed,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Blocking (awaiting) send primitive the emitter drains into.
#[async_trait]
pub trait DeltaTransport: Send + Sync {
    async fn send(&self, delta: &MetricDelta) -> SendOutcome;

    /// Establish the connection ahead of the first send. Optional.
    async fn warm_up(&self) {}
}
