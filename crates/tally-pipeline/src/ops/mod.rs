//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : scrape text rendered from the aggregator on every request

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::aggregator::Aggregator;
use crate::obs::metrics::CONTENT_TYPE;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(aggregator): State<Arc<Aggregator>>) -> Response {
    let body = aggregator.render();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}
