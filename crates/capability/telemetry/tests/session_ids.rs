use ingest_telemetry::{metrics, new_session_id, record_malformed_tags, record_points_written};

#[test]
fn session_ids_are_unique() {
    let first = new_session_id();
    let second = new_session_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn counters_only_increase() {
    let before = metrics().snapshot();
    record_points_written(3);
    record_malformed_tags(2);
    let after = metrics().snapshot();
    assert!(after.points_written >= before.points_written + 3);
    assert!(after.malformed_tags >= before.malformed_tags + 2);
}
