use domain::{Point, Timestamp};
use ingest_storage::{LoggingSeriesWriter, SeriesWriter};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;

fn sample_point(i: i64) -> Point {
    Point::with_value(
        format!("load.{}", i % 7),
        BTreeMap::new(),
        Timestamp::from_secs(1_356_998_400 + i),
        i as f64,
    )
}

#[tokio::test]
async fn counts_writes_without_retaining_points() {
    let writer = LoggingSeriesWriter::new();

    for i in 0..10_000 {
        let written = writer
            .write_series("graphite", "", vec![sample_point(i)])
            .await
            .expect("write");
        assert_eq!(written, 1);
    }
    let written = writer
        .write_series("opentsdb", "raw", vec![sample_point(1), sample_point(2)])
        .await
        .expect("write");
    assert_eq!(written, 2);

    assert_eq!(writer.written(), 10_002);
    // 状态只有一个计数器，写入多少点位都不会增长
    assert_eq!(
        std::mem::size_of::<LoggingSeriesWriter>(),
        std::mem::size_of::<AtomicU64>()
    );
}

#[tokio::test]
async fn empty_batch_is_accepted() {
    let writer = LoggingSeriesWriter::new();
    let written = writer
        .write_series("opentsdb", "", Vec::new())
        .await
        .expect("write");
    assert_eq!(written, 0);
    assert_eq!(writer.written(), 0);
}
