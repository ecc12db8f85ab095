use domain::{FieldValue, Point, Timestamp};
use std::collections::BTreeMap;

#[test]
fn millis_split_into_secs_and_subsec() {
    let ts = Timestamp::from_millis(1_356_998_400_123);
    assert_eq!(ts.secs, 1_356_998_400);
    assert_eq!(ts.nanos, 123_000_000);
    assert_eq!(ts.subsec_millis(), 123);
}

#[test]
fn secs_have_no_subsec_component() {
    let ts = Timestamp::from_secs(1_356_998_400);
    assert_eq!(ts.nanos, 0);
    assert_eq!(ts.to_string(), "1356998400");
}

#[test]
fn negative_millis_borrow_from_secs() {
    let ts = Timestamp::from_millis(-1);
    assert_eq!(ts, Timestamp { secs: -1, nanos: 999_000_000 });
}

#[test]
fn nanos_overflow_carries_into_secs() {
    let ts = Timestamp::new(10, 1_500_000_000);
    assert_eq!(ts, Timestamp { secs: 11, nanos: 500_000_000 });
    assert_eq!(ts.to_string(), "11.500000000");
}

#[test]
fn point_with_value_has_single_field() {
    let mut tags = BTreeMap::new();
    tags.insert("host".to_string(), "webserver01".to_string());
    tags.insert("cpu".to_string(), "0".to_string());
    let point = Point::with_value("sys.cpu.user", tags, Timestamp::from_secs(1), 42.5);

    assert_eq!(point.fields.len(), 1);
    assert_eq!(point.fields.get("value"), Some(&FieldValue::F64(42.5)));
    assert_eq!(point.value(), Some(42.5));
    assert_eq!(point.series_key(), "sys.cpu.user,cpu=0,host=webserver01");
}
