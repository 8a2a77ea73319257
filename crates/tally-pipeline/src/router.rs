//! Axum router wiring.
//!
//! The scrape router is served by the coordinator only. The app router is
//! the instrumented surface any role may expose; every routed request there
//! emits one priority delta.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::aggregator::Aggregator;
use crate::emitter::MetricsSink;
use crate::{middleware, ops};

pub fn build_scrape_router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(aggregator)
}

pub fn build_app_router(sink: Arc<dyn MetricsSink>) -> Router {
    instrument(Router::new().route("/healthz", get(ops::healthz)), sink)
}

/// Wrap every route of `router` with request counting and latency tracking.
pub fn instrument(router: Router, sink: Arc<dyn MetricsSink>) -> Router {
    router.route_layer(axum::middleware::from_fn_with_state(
        sink,
        middleware::track_requests,
    ))
}
