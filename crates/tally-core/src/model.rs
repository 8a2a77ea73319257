//! Metric value types.
//!
//! A `MetricDelta` is what producers emit: a set of non-negative increments
//! scoped to one key. `EndpointTotals` is what the collector keeps per key.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

/// Reserved key for whole-system counters (business events).
///
/// Every other key is treated as a per-endpoint scope.
pub const GLOBAL_SCOPE_KEY: &str = "";

/// Business event counters. They are only rendered for the global scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessCounter {
    PvzCreated,
    ReceptionsCreated,
    ProductsAdded,
}

impl BusinessCounter {
    pub const ALL: [BusinessCounter; 3] = [
        BusinessCounter::PvzCreated,
        BusinessCounter::ReceptionsCreated,
        BusinessCounter::ProductsAdded,
    ];

    /// Exposition metric name.
    pub fn metric_name(self) -> &'static str {
        match self {
            BusinessCounter::PvzCreated => "pvz_created_total",
            BusinessCounter::ReceptionsCreated => "receptions_created_total",
            BusinessCounter::ProductsAdded => "products_added_total",
        }
    }
}

/// Incremental change to the counters of one key.
///
/// Field names on the wire match the collector's line format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    /// Aggregation key; `GLOBAL_SCOPE_KEY` for system-wide counters.
    #[serde(rename = "endpoint", default)]
    pub key: String,
    #[serde(rename = "http_requests_delta", default)]
    pub http_requests: u64,
    /// Latency in seconds.
    #[serde(rename = "response_time_delta", default)]
    pub response_time: f64,
    #[serde(rename = "pvz_created_delta", default)]
    pub pvz_created: u64,
    #[serde(rename = "receptions_created_delta", default)]
    pub receptions_created: u64,
    #[serde(rename = "products_added_delta", default)]
    pub products_added: u64,
}

impl MetricDelta {
    /// Empty delta for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// One handled request that took `elapsed`.
    pub fn request(key: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(key)
            .with_requests(1)
            .with_latency_secs(elapsed.as_secs_f64())
    }

    /// `n` business events of one kind, in the global scope.
    pub fn business(counter: BusinessCounter, n: u64) -> Self {
        Self::new(GLOBAL_SCOPE_KEY).with_business(counter, n)
    }

    pub fn with_requests(mut self, n: u64) -> Self {
        self.http_requests = n;
        self
    }

    pub fn with_latency_secs(mut self, secs: f64) -> Self {
        self.response_time = secs;
        self
    }

    pub fn with_business(mut self, counter: BusinessCounter, n: u64) -> Self {
        match counter {
            BusinessCounter::PvzCreated => self.pvz_created = n,
            BusinessCounter::ReceptionsCreated => self.receptions_created = n,
            BusinessCounter::ProductsAdded => self.products_added = n,
        }
        self
    }

    pub fn is_global(&self) -> bool {
        self.key == GLOBAL_SCOPE_KEY
    }

    /// Latency must be a finite, non-negative number of seconds.
    /// Integer counters are non-negative by construction.
    pub fn validate(&self) -> Result<()> {
        if !self.response_time.is_finite() || self.response_time < 0.0 {
            return Err(MetricsError::Decode(format!(
                "response_time_delta must be finite and >= 0, got {}",
                self.response_time
            )));
        }
        Ok(())
    }
}

/// Cumulative counters for one key.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EndpointTotals {
    pub http_requests_total: u64,
    /// Sum of request latencies in seconds.
    pub response_time_total: f64,
    pub pvz_created_total: u64,
    pub receptions_created_total: u64,
    pub products_added_total: u64,
}

impl EndpointTotals {
    /// Add every field of `delta`.
    pub fn apply(&mut self, delta: &MetricDelta) {
        self.http_requests_total = self.http_requests_total.saturating_add(delta.http_requests);
        self.response_time_total += delta.response_time;
        self.pvz_created_total = self.pvz_created_total.saturating_add(delta.pvz_created);
        self.receptions_created_total = self
            .receptions_created_total
            .saturating_add(delta.receptions_created);
        self.products_added_total = self.products_added_total.saturating_add(delta.products_added);
    }

    pub fn business(&self, counter: BusinessCounter) -> u64 {
        match counter {
            BusinessCounter::PvzCreated => self.pvz_created_total,
            BusinessCounter::ReceptionsCreated => self.receptions_created_total,
            BusinessCounter::ProductsAdded => self.products_added_total,
        }
    }

    /// Mean latency in seconds, `None` before the first request.
    pub fn average_latency(&self) -> Option<f64> {
        if self.http_requests_total == 0 {
            return None;
        }
        Some(self.response_time_total / self.http_requests_total as f64)
    }
}
