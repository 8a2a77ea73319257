//! Collector-side aggregate store.
//!
//! The single source of truth for current totals. All access goes through
//! one mutex, held only for a field update or a snapshot copy.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tally_core::{EndpointTotals, MetricDelta};

use crate::obs::metrics;

/// Where decoded deltas go. The IPC server depends on this, not on
/// `Aggregator`, so tests can plug in a spy.
pub trait DeltaSink: Send + Sync {
    fn merge(&self, delta: MetricDelta);
}

/// Key -> totals, ordered so renders are stable.
pub type Snapshot = BTreeMap<String, EndpointTotals>;

#[derive(Default)]
pub struct Aggregator {
    store: Mutex<Snapshot>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, taken under the lock.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    pub fn totals(&self, key: &str) -> Option<EndpointTotals> {
        self.lock().get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Scrape text for the current totals.
    pub fn render(&self) -> String {
        metrics::render(&self.snapshot())
    }

    // Poisoned lock: keep serving the last state instead of panicking.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeltaSink for Aggregator {
    fn merge(&self, delta: MetricDelta) {
        let mut store = self.lock();
        match store.get_mut(delta.key.as_str()) {
            Some(totals) => totals.apply(&delta),
            None => {
                let mut totals = EndpointTotals::default();
                totals.apply(&delta);
                store.insert(delta.key, totals);
            }
        }
    }
}
