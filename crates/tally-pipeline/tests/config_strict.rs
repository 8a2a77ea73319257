#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tally_pipeline::bootstrap::ProcessRole;
use tally_pipeline::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
buffers:
  worker: { priority: 20, importnat: 40 } # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.role, ProcessRole::Coordinator);
    assert_eq!(cfg.ipc.socket_path, "/tmp/metrics.sock");
    assert_eq!(cfg.scrape.listen, "0.0.0.0:9000");
    assert!(cfg.app.listen.is_none());

    let coord = cfg.buffers.for_role(ProcessRole::Coordinator);
    assert_eq!((coord.priority, coord.important), (200, 400));
    let worker = cfg.buffers.for_role(ProcessRole::Worker);
    assert_eq!((worker.priority, worker.important), (20, 40));
    assert_eq!(cfg.buffers.important_fallback_timeout_ms, 5000);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
role: worker
ipc:
  socket_path: /run/tally/metrics.sock
buffers:
  coordinator: { priority: 1000, important: 2000 }
  worker: { priority: 5, important: 10 }
  important_fallback_timeout_ms: 250
scrape:
  listen: 127.0.0.1:9100
app:
  listen: 127.0.0.1:8081
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.role, ProcessRole::Worker);
    assert_eq!(cfg.ipc.socket_path, "/run/tally/metrics.sock");
    assert_eq!(cfg.buffers.for_role(ProcessRole::Worker).important, 10);
    assert_eq!(cfg.app.listen.as_deref(), Some("127.0.0.1:8081"));
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn zero_capacity_rejected() {
    let bad = r#"
version: 1
buffers:
  coordinator: { priority: 0, important: 400 }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn empty_socket_path_rejected() {
    let bad = r#"
version: 1
ipc:
  socket_path: "  "
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn unknown_role_rejected() {
    let err = config::load_from_str("version: 1\nrole: leader\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn role_parsing_and_pool_size() {
    assert_eq!(" Worker ".parse::<ProcessRole>().unwrap(), ProcessRole::Worker);
    assert!("leader".parse::<ProcessRole>().is_err());

    assert_eq!(ProcessRole::Worker.worker_count(), 1);
    assert!(ProcessRole::Coordinator.worker_count() >= 1);
    assert!(ProcessRole::Coordinator.runs_collector());
    assert!(!ProcessRole::Worker.runs_collector());
}

#[test]
fn missing_file_is_bad_config() {
    let err = config::load_from_file("/nonexistent/tally.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}
