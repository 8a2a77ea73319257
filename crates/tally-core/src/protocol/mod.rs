//! Wire formats.
//!
//! The IPC socket carries one JSON-encoded `MetricDelta` per line. Decoding
//! is panic-free: a malformed line is reported as `MetricsError::Decode` so
//! the reader can skip it and keep the connection.

pub mod line;
