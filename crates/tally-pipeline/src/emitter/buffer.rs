use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};

use tally_core::error::{MetricsError, Result};
use tally_core::MetricDelta;

use crate::bootstrap::ProcessRole;
use crate::config::{BufferSection, LaneCapacities};
use crate::transport::DeltaTransport;

use super::{MetricKind, MetricsSink};

type Lane = mpsc::Receiver<MetricDelta>;
type SharedLane = Arc<tokio::sync::Mutex<Lane>>;

/// Sizing for one emitter.
#[derive(Debug, Clone, Copy)]
pub struct EmitterSettings {
    pub capacities: LaneCapacities,
    /// Drain tasks per lane.
    pub workers: usize,
    /// Upper bound on a direct send of an important delta that overflowed.
    pub fallback_timeout: Duration,
}

impl EmitterSettings {
    pub fn for_role(buffers: &BufferSection, role: ProcessRole) -> Self {
        Self {
            capacities: buffers.for_role(role),
            workers: role.worker_count(),
            fallback_timeout: Duration::from_millis(buffers.important_fallback_timeout_ms),
        }
    }
}

#[derive(Default)]
struct EmitterStats {
    dropped_priority: AtomicU64,
    fallback_sends: AtomicU64,
}

struct PendingLanes {
    priority: Lane,
    important: Lane,
}

/// Two bounded lanes drained by a small task pool.
///
/// Construction only allocates the lanes; nothing consumes them until
/// `start`. Deltas emitted before that wait in the buffer (or overflow).
///
/// The runtime handle is captured at construction (or at `start`), so
/// emitting from a thread outside the runtime still reaches the transport.
pub struct Emitter {
    priority_tx: mpsc::Sender<MetricDelta>,
    important_tx: mpsc::Sender<MetricDelta>,
    pending: Mutex<Option<PendingLanes>>,
    runtime: OnceLock<Handle>,
    transport: Arc<dyn DeltaTransport>,
    workers: usize,
    fallback_timeout: Duration,
    stats: EmitterStats,
}

impl Emitter {
    pub fn new(settings: EmitterSettings, transport: Arc<dyn DeltaTransport>) -> Result<Self> {
        let LaneCapacities { priority, important } = settings.capacities;
        if priority == 0 || important == 0 {
            return Err(MetricsError::BadConfig("emitter lane capacities must be >= 1".into()));
        }
        if settings.workers == 0 {
            return Err(MetricsError::BadConfig("emitter needs at least one drain worker".into()));
        }

        let runtime = OnceLock::new();
        if let Ok(handle) = Handle::try_current() {
            let _ = runtime.set(handle);
        }

        let (priority_tx, priority_rx) = mpsc::channel(priority);
        let (important_tx, important_rx) = mpsc::channel(important);

        Ok(Self {
            priority_tx,
            important_tx,
            pending: Mutex::new(Some(PendingLanes {
                priority: priority_rx,
                important: important_rx,
            })),
            runtime,
            transport,
            workers: settings.workers,
            fallback_timeout: settings.fallback_timeout,
            stats: EmitterStats::default(),
        })
    }

    /// Spawn the drain pool and warm up the transport in the background.
    /// A second call is a no-op.
    pub fn start(&self) -> Result<()> {
        let handle = match self.runtime.get() {
            Some(handle) => handle.clone(),
            None => {
                let handle = Handle::try_current().map_err(|e| {
                    MetricsError::Internal(format!("emitter start needs a tokio runtime: {e}"))
                })?;
                self.runtime.get_or_init(|| handle).clone()
            }
        };

        let taken = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(lanes) = taken else {
            tracing::warn!("emitter already started");
            return Ok(());
        };

        for (kind, rx) in [
            (MetricKind::Priority, lanes.priority),
            (MetricKind::Important, lanes.important),
        ] {
            let rx: SharedLane = Arc::new(tokio::sync::Mutex::new(rx));
            for _ in 0..self.workers {
                handle.spawn(drain(kind, Arc::clone(&rx), Arc::clone(&self.transport)));
            }
        }

        let transport = Arc::clone(&self.transport);
        handle.spawn(async move { transport.warm_up().await });

        tracing::info!(workers = self.workers, "emitter started");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Priority deltas discarded because their lane was full.
    pub fn dropped_priority(&self) -> u64 {
        self.stats.dropped_priority.load(Ordering::Relaxed)
    }

    /// Important deltas that bypassed a full lane.
    pub fn fallback_sends(&self) -> u64 {
        self.stats.fallback_sends.load(Ordering::Relaxed)
    }

    /// Buffered deltas per lane: `(priority, important)`.
    pub fn queued(&self) -> (usize, usize) {
        (queued(&self.priority_tx), queued(&self.important_tx))
    }

    /// Send an overflowing important delta on its own task, bounded by
    /// `fallback_timeout`, so the caller never waits on the socket.
    fn send_direct(&self, delta: MetricDelta) {
        let handle = match self.runtime.get().cloned().or_else(|| Handle::try_current().ok()) {
            Some(h) => h,
            None => {
                tracing::warn!(key = %delta.key, "no runtime for important fallback, delta lost");
                return;
            }
        };

        self.stats.fallback_sends.fetch_add(1, Ordering::Relaxed);
        let transport = Arc::clone(&self.transport);
        let limit = self.fallback_timeout;
        handle.spawn(async move {
            match tokio::time::timeout(limit, transport.send(&delta)).await {
                Ok(outcome) if outcome.is_sent() => {}
                Ok(outcome) => {
                    tracing::warn!(key = %delta.key, ?outcome, "important fallback send failed")
                }
                Err(_) => tracing::warn!(key = %delta.key, "important fallback send timed out"),
            }
        });
    }
}

impl MetricsSink for Emitter {
    fn emit_priority(&self, delta: MetricDelta) {
        match self.priority_tx.try_send(delta) {
            Ok(()) => {}
            Err(TrySendError::Full(delta)) => {
                self.stats.dropped_priority.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(key = %delta.key, "priority buffer full, dropping delta");
            }
            Err(TrySendError::Closed(delta)) => {
                tracing::warn!(key = %delta.key, "priority buffer closed, dropping delta");
            }
        }
    }

    fn emit_important(&self, delta: MetricDelta) {
        match self.important_tx.try_send(delta) {
            Ok(()) => {}
            Err(TrySendError::Full(delta)) => {
                tracing::debug!(key = %delta.key, "important buffer full, sending directly");
                self.send_direct(delta);
            }
            Err(TrySendError::Closed(delta)) => self.send_direct(delta),
        }
    }
}

fn queued(tx: &mpsc::Sender<MetricDelta>) -> usize {
    tx.max_capacity() - tx.capacity()
}

async fn drain(kind: MetricKind, rx: SharedLane, transport: Arc<dyn DeltaTransport>) {
    loop {
        let next = rx.lock().await.recv().await;
        let Some(delta) = next else { break };

        let outcome = transport.send(&delta).await;
        if !outcome.is_sent() {
            tracing::debug!(lane = kind.as_str(), key = %delta.key, ?outcome, "delta lost");
        }
    }
    tracing::debug!(lane = kind.as_str(), "drain worker stopped");
}
