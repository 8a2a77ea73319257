//! Text exposition of aggregate totals.
//!
//! Per endpoint (every key except the global scope):
//! `http_requests_total{endpoint="<key>"} <int>` and
//! `http_request_duration_total{endpoint="<key>"} <seconds, 6 decimals>`.
//! Business counters are rendered once, unlabelled, from the global scope.

use std::fmt::Write;

use tally_core::{BusinessCounter, EndpointTotals, GLOBAL_SCOPE_KEY};

use crate::aggregator::Snapshot;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const REQUESTS_METRIC: &str = "http_requests_total";
pub const DURATION_METRIC: &str = "http_request_duration_total";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    for (key, totals) in snapshot.iter().filter(|(k, _)| k.as_str() != GLOBAL_SCOPE_KEY) {
        render_endpoint(key, totals, &mut out);
    }

    if let Some(global) = snapshot.get(GLOBAL_SCOPE_KEY) {
        for counter in BusinessCounter::ALL {
            let _ = writeln!(out, "{} {}", counter.metric_name(), global.business(counter));
        }
    }

    out
}

fn render_endpoint(key: &str, totals: &EndpointTotals, out: &mut String) {
    let label = escape_label(key);
    let _ = writeln!(out, "{REQUESTS_METRIC}{{endpoint=\"{label}\"}} {}", totals.http_requests_total);
    let _ = writeln!(
        out,
        "{DURATION_METRIC}{{endpoint=\"{label}\"}} {:.6}",
        totals.response_time_total
    );
}
