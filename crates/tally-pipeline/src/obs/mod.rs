//! Scrape exposition.
//!
//! Renders aggregate snapshots in a flat Prometheus-compatible text format.

pub mod metrics;
