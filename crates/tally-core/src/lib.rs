//! tally core: metric value types, the IPC line codec, and the shared error type.
//!
//! This crate defines the wire-level contract between worker processes and
//! the collector. It carries no runtime or transport dependencies so both
//! sides of the socket (and tooling) can depend on it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed records
//! coming off the socket surface as `MetricsError::Decode` so the collector
//! can skip a line instead of crashing.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, MetricsError, Result};
pub use model::{BusinessCounter, EndpointTotals, MetricDelta, GLOBAL_SCOPE_KEY};
