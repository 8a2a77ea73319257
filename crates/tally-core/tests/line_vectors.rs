//! Line codec vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tally_core::protocol::line::{decode_line, encode_line, trim_line};
use tally_core::{BusinessCounter, MetricDelta};

mod vector_loader;
use vector_loader::load;

#[test]
fn line_vectors() {
    let files = [
        "line_request.json",
        "line_business_partial.json",
        "line_crlf_unknown_field.json",
        "line_negative_latency.json",
        "line_negative_count.json",
        "line_garbage.json",
        "line_empty.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_line(v.line.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let delta = res.expect("expected ok delta");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(delta.key, ex["key"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(delta.http_requests, ex["http_requests"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(delta.response_time, ex["response_time"].as_f64().unwrap(), "vector={}", v.description);
        assert_eq!(delta.pvz_created, ex["pvz_created"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(delta.receptions_created, ex["receptions_created"].as_u64().unwrap(), "vector={}", v.description);
        assert_eq!(delta.products_added, ex["products_added"].as_u64().unwrap(), "vector={}", v.description);
    }
}

#[test]
fn encoded_line_is_single_terminated_record() {
    let delta = MetricDelta::new("/a\nb").with_requests(2).with_latency_secs(1.5);
    let line = encode_line(&delta).unwrap();

    assert_eq!(line.last(), Some(&b'\n'));
    assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);

    let text = std::str::from_utf8(&line).unwrap();
    assert!(text.contains(r#""endpoint":"/a\nb""#));
    assert!(text.contains(r#""http_requests_delta":2"#));
    assert_eq!(decode_line(&line).unwrap(), delta);
}

#[test]
fn business_delta_uses_wire_names() {
    let line = encode_line(&MetricDelta::business(BusinessCounter::ReceptionsCreated, 4)).unwrap();
    let text = std::str::from_utf8(&line).unwrap();
    assert!(text.contains(r#""endpoint":"""#));
    assert!(text.contains(r#""receptions_created_delta":4"#));
}

#[test]
fn invalid_utf8_is_a_decode_error() {
    let err = decode_line(b"{\"endpoint\":\"\xff\"}\n").unwrap_err();
    assert_eq!(err.code().as_str(), "DECODE");
}

#[test]
fn trim_only_strips_terminators() {
    assert_eq!(trim_line(b"abc\r\n"), b"abc");
    assert_eq!(trim_line(b"abc\n"), b"abc");
    assert_eq!(trim_line(b" abc "), b" abc ");
}
