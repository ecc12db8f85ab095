//! 日志写入器
//!
//! 不保留任何点位，只按点记录 debug 日志并累计写入数量。
//! 作为接入服务在未接入真实时序库时的默认写入目标。

use crate::error::StorageError;
use crate::traits::SeriesWriter;
use domain::Point;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// 只记录日志、不保留点位的写入器
#[derive(Debug, Default)]
pub struct LoggingSeriesWriter {
    written: AtomicU64,
}

impl LoggingSeriesWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累计确认写入的点位数
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl SeriesWriter for LoggingSeriesWriter {
    async fn write_series(
        &self,
        database: &str,
        retention_policy: &str,
        points: Vec<Point>,
    ) -> Result<u64, StorageError> {
        log_points(database, retention_policy, &points);
        let count = points.len() as u64;
        self.written.fetch_add(count, Ordering::Relaxed);
        Ok(count)
    }
}

pub(crate) fn log_points(database: &str, retention_policy: &str, points: &[Point]) {
    for point in points {
        debug!(
            target: "ingest.storage",
            database = %database,
            retention_policy = %retention_policy,
            series = %point.series_key(),
            timestamp = %point.timestamp,
            "point_written"
        );
    }
}
