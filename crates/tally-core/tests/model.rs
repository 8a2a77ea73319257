#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tally_core::{BusinessCounter, EndpointTotals, MetricDelta, GLOBAL_SCOPE_KEY};

#[test]
fn request_delta_counts_one_request() {
    let d = MetricDelta::request("/pvz", Duration::from_millis(250));
    assert_eq!(d.key, "/pvz");
    assert_eq!(d.http_requests, 1);
    assert!((d.response_time - 0.25).abs() < 1e-9);
    assert!(!d.is_global());
}

#[test]
fn business_delta_is_global() {
    let d = MetricDelta::business(BusinessCounter::PvzCreated, 1);
    assert_eq!(d.key, GLOBAL_SCOPE_KEY);
    assert!(d.is_global());
    assert_eq!(d.pvz_created, 1);
    assert_eq!(d.http_requests, 0);
}

#[test]
fn zero_delta_changes_nothing() {
    let mut t = EndpointTotals::default();
    t.apply(&MetricDelta::new("/a").with_requests(3).with_latency_secs(0.3));
    let before = t;
    t.apply(&MetricDelta::new("/a"));
    assert_eq!(t, before);
}

#[test]
fn totals_add_fieldwise() {
    let mut t = EndpointTotals::default();
    t.apply(&MetricDelta::new("/a").with_requests(5).with_latency_secs(1.0));
    t.apply(
        &MetricDelta::new("/a")
            .with_requests(2)
            .with_latency_secs(0.4)
            .with_business(BusinessCounter::ProductsAdded, 3),
    );
    assert_eq!(t.http_requests_total, 7);
    assert!((t.response_time_total - 1.4).abs() < 1e-9);
    assert_eq!(t.business(BusinessCounter::ProductsAdded), 3);
    assert_eq!(t.business(BusinessCounter::PvzCreated), 0);
}

#[test]
fn counters_saturate_instead_of_wrapping() {
    let mut t = EndpointTotals::default();
    t.apply(&MetricDelta::new("/a").with_requests(u64::MAX));
    t.apply(&MetricDelta::new("/a").with_requests(1));
    assert_eq!(t.http_requests_total, u64::MAX);
}

#[test]
fn average_latency() {
    let mut t = EndpointTotals::default();
    assert_eq!(t.average_latency(), None);
    t.apply(&MetricDelta::new("/a").with_requests(4).with_latency_secs(2.0));
    assert_eq!(t.average_latency(), Some(0.5));
}

#[test]
fn validate_rejects_nan_latency() {
    let d = MetricDelta::new("/a").with_latency_secs(f64::NAN);
    assert_eq!(d.validate().unwrap_err().code().as_str(), "DECODE");
    assert!(MetricDelta::new("/a").with_latency_secs(0.0).validate().is_ok());
}
