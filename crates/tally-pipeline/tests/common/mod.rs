//! Helpers shared by the pipeline integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tally_core::MetricDelta;
use tally_pipeline::{MetricKind, MetricsSink};

/// Poll `cond` for up to ~2s.
pub async fn eventually<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: axum::Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Minimal HTTP/1.1 GET; returns the raw response text.
pub async fn http_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    out
}

/// Sink that records what business code emitted.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(MetricKind, MetricDelta)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(MetricKind, MetricDelta)> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn emit_priority(&self, delta: MetricDelta) {
        self.events.lock().unwrap().push((MetricKind::Priority, delta));
    }

    fn emit_important(&self, delta: MetricDelta) {
        self.events.lock().unwrap().push((MetricKind::Important, delta));
    }
}
