//! End-to-end use of inline snapshots the way a test author writes them.

use std::time::{SystemTime, UNIX_EPOCH};

use inline_snap::{snap, Snapshot, TestContext};
use serde::Serialize;

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis()
}

#[test]
fn snap_diff() {
    let t = TestContext::new("snap_diff");
    let check_addition = |x: i32, y: i32, want: Snapshot| {
        want.diff(&(x + y).to_string());
    };

    check_addition(2, 2, snap(&t, "4"));
}

#[test]
fn snap_inline_ignore() {
    let t = TestContext::new("snap_inline_ignore");
    let check = |want: Snapshot| {
        want.diff(&format!("the current Unix ms time is {} ms", unix_millis()));
    };

    check(snap(&t, "the current Unix ms time is <snap:ignore> ms"));
}

#[derive(Serialize)]
struct Person {
    name: String,
    age: u32,
    #[serde(skip)]
    #[allow(dead_code)]
    ignored_field: String,
}

#[test]
fn snap_json() {
    let t = TestContext::new("snap_json");
    let check_json = |want: Snapshot| {
        let p = Person {
            name: "Doug".into(),
            age: 20,
            ignored_field: "bar".into(),
        };
        want.diff_json(&p, "  ");
    };

    check_json(snap(&t, r#"{
  "name": "Doug",
  "age": 20
}"#));
}

#[derive(Serialize)]
struct StampedPerson {
    name: &'static str,
    age: u32,
    timestamp: String,
}

#[test]
fn snap_json_with_ignore() {
    let t = TestContext::new("snap_json_with_ignore");
    let check_json = |want: Snapshot| {
        let p = StampedPerson {
            name: "Doug",
            age: 20,
            timestamp: format!("{}", unix_millis()),
        };
        want.diff_json(&p, "  ");
    };

    check_json(snap(&t, r#"{
  "name": "Doug",
  "age": 20,
  "timestamp": "<snap:ignore>"
}"#));
}

#[test]
fn aliased_crate_path() {
    use inline_snap as s;

    let t = TestContext::new("aliased_crate_path");
    s::snap(&t, "multiple <snap:ignore> on <snap:ignore> line").diff("multiple markers on one line");
}

#[test]
fn mismatch_fails_the_context() {
    let t = TestContext::quiet("mismatch_fails_the_context");
    snap(&t, "8")
        .with_config(inline_snap::Config::default())
        .diff("4");

    let failures = t.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].ends_with("snap: Snapshot differs: (-want +got):\n-8\n+4\n"));
    assert!(failures[0].contains("snapshot_tests.rs:"));
}
