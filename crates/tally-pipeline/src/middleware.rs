//! Request instrumentation.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use tally_core::MetricDelta;

use crate::emitter::MetricsSink;

/// Key used when a request reached the layer without a matched route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Time the inner handler and emit one priority delta keyed by route.
pub async fn track_requests(
    State(sink): State<Arc<dyn MetricsSink>>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());

    let started = Instant::now();
    let resp = next.run(req).await;
    sink.emit_priority(MetricDelta::request(key, started.elapsed()));

    resp
}
