//! tally pipeline library entry.
//!
//! Cross-process metrics: workers emit deltas into bounded buffers, a
//! Unix-socket transport ships them to the coordinator, and the coordinator
//! aggregates and serves them for scraping. Consumed by the `tallyd` binary
//! and by integration tests.

pub mod aggregator;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod emitter;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;

pub use aggregator::{Aggregator, DeltaSink};
pub use emitter::{Emitter, MetricKind, MetricsSink, NoopSink};
