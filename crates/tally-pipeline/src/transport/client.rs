//! Worker-side IPC client.
//!
//! Holds at most one outbound stream. A single mutex covers both
//! get-or-create and write, so the invalidate-on-error path can never race
//! with a concurrent writer.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use tally_core::protocol::line::encode_line;
use tally_core::MetricDelta;

use super::{DeltaTransport, SendOutcome};

pub struct IpcClient {
    socket_path: PathBuf,
    conn: Mutex<Option<UnixStream>>,
}

impl IpcClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            conn: Mutex::new(None),
        }
    }

    /// Dial if there is no live stream. Returns whether one is available.
    pub async fn ensure_connected(&self) -> bool {
        let mut slot = self.conn.lock().await;
        self.connect(&mut slot).await.is_some()
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Get-or-create under the caller's lock. Dial failure is transient:
    /// logged, and retried on the next send.
    async fn connect<'a>(&self, slot: &'a mut Option<UnixStream>) -> Option<&'a mut UnixStream> {
        if slot.is_none() {
            match UnixStream::connect(&self.socket_path).await {
                Ok(stream) => {
                    tracing::info!(path = %self.socket_path.display(), "ipc connection established");
                    *slot = Some(stream);
                }
                Err(e) => {
                    tracing::warn!(path = %self.socket_path.display(), error = %e, "ipc connect failed");
                    return None;
                }
            }
        }
        slot.as_mut()
    }
}

#[async_trait]
impl DeltaTransport for IpcClient {
    async fn send(&self, delta: &MetricDelta) -> SendOutcome {
        let line = match encode_line(delta) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(key = %delta.key, error = %e, "ipc encode failed");
                return SendOutcome::EncodeFailed;
            }
        };

        let mut slot = self.conn.lock().await;
        let Some(stream) = self.connect(&mut slot).await else {
            return SendOutcome::NoConnection;
        };

        let written = stream.write_all(&line).await;
        if let Err(e) = written {
            // At-most-once: the stream is dropped with whatever it carried.
            tracing::warn!(error = %e, "ipc write failed, dropping connection");
            *slot = None;
            return SendOutcome::WriteFailed;
        }

        tracing::trace!(key = %delta.key, "delta sent");
        SendOutcome::Sent
    }

    async fn warm_up(&self) {
        self.ensure_connected().await;
    }
}
