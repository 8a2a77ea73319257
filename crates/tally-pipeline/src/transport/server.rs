//! Collector-side IPC server.
//!
//! One accept loop, one task per connection. A malformed line is skipped and
//! the connection keeps going; a read error or an oversized line ends only
//! that connection.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tracing::Instrument;

use tally_core::error::{MetricsError, Result};
use tally_core::protocol::line::{decode_line, trim_line, DELIMITER};

use crate::aggregator::DeltaSink;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Longest accepted line, delimiter excluded.
pub const MAX_LINE: usize = 64 * 1024;

pub struct IpcServer {
    listener: UnixListener,
    path: PathBuf,
    sink: Arc<dyn DeltaSink>,
}

/// Per-connection line counts, reported when the connection ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStats {
    pub merged: u64,
    pub skipped: u64,
}

impl IpcServer {
    /// Remove any stale socket file, then bind. Must run inside a tokio runtime.
    ///
    /// A bind failure is a misconfiguration; callers should treat it as fatal.
    pub fn bind(path: impl Into<PathBuf>, sink: Arc<dyn DeltaSink>) -> Result<Self> {
        let path = path.into();
        remove_stale_socket(&path);

        let listener = UnixListener::bind(&path).map_err(|source| MetricsError::Bind {
            target: path.display().to_string(),
            source,
        })?;
        tracing::info!(path = %path.display(), "ipc server listening");

        Ok(Self { listener, path, sink })
    }

    pub fn local_path(&self) -> &Path {
        &self.path
    }

    /// Run the accept loop in the background.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.accept_loop())
    }

    async fn accept_loop(self) {
        let mut conn_id: u64 = 0;
        loop {
            match self.listener.accept().await {
                Ok((stream, _)) => {
                    conn_id += 1;
                    let sink = Arc::clone(&self.sink);
                    let span = tracing::info_span!("ipc_conn", conn_id);
                    tokio::spawn(
                        async move {
                            let stats = handle_connection(stream, sink).await;
                            tracing::debug!(merged = stats.merged, skipped = stats.skipped, "ipc connection closed");
                        }
                        .instrument(span),
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ipc accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Read newline-delimited deltas until EOF or a stream error, merging each
/// well-formed line into `sink`. A line longer than `MAX_LINE` is counted as
/// skipped and ends the connection. The stream is closed when this returns.
pub async fn handle_connection<R>(stream: R, sink: Arc<dyn DeltaSink>) -> ConnectionStats
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(256);
    let mut stats = ConnectionStats::default();

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE as u64 + 1)
            .read_until(DELIMITER, &mut buf)
            .await;
        match read {
            Ok(0) => break,
            Ok(_) => {
                if buf.len() > MAX_LINE && buf.last() != Some(&DELIMITER) {
                    tracing::warn!(limit = MAX_LINE, "ipc line too long, closing connection");
                    stats.skipped += 1;
                    break;
                }
                if trim_line(&buf).is_empty() {
                    continue;
                }
                match decode_line(&buf) {
                    Ok(delta) => {
                        sink.merge(delta);
                        stats.merged += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed ipc line");
                        stats.skipped += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "ipc read failed, closing connection");
                break;
            }
        }
    }

    stats
}

/// Unix sockets are not reclaimed when a process dies; clear the path first.
fn remove_stale_socket(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed stale ipc socket"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove stale ipc socket"),
    }
}
