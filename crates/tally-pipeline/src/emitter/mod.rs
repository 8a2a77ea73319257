//! Worker-side metric emission.
//!
//! Request handling code depends on `MetricsSink` only. The concrete
//! `Emitter` buffers deltas in two bounded lanes and drains them to a
//! `DeltaTransport` in the background.

pub mod buffer;

use tally_core::MetricDelta;

pub use buffer::{Emitter, EmitterSettings};

/// Delivery class of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Tech metrics (request count, latency). Dropped when the lane is full.
    Priority,
    /// Business events. Never dropped because of a full lane.
    Important,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Priority => "priority",
            MetricKind::Important => "important",
        }
    }
}

/// Fire-and-forget capability handed to business code.
///
/// Implementations must never block the caller on I/O and never fail.
pub trait MetricsSink: Send + Sync {
    fn emit_priority(&self, delta: MetricDelta);
    fn emit_important(&self, delta: MetricDelta);

    fn emit(&self, kind: MetricKind, delta: MetricDelta) {
        match kind {
            MetricKind::Priority => self.emit_priority(delta),
            MetricKind::Important => self.emit_important(delta),
        }
    }
}

/// Sink that discards everything. For tests and metric-less setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn emit_priority(&self, _delta: MetricDelta) {}
    fn emit_important(&self, _delta: MetricDelta) {}
}
