//! 点位分发
//!
//! 把单个 Point 作为一元素批次交给 [`SeriesWriter`]。写入失败只记录日志，
//! 不重试、不排队，监听器继续处理下一行。

use domain::Point;
use ingest_storage::SeriesWriter;
use ingest_telemetry::{record_points_written, record_write_failure};
use std::sync::Arc;
use tracing::warn;

/// 点位分发器
///
/// 目标库与保留策略在构造后不可变，可被任意多个连接任务共享。
pub struct PointDispatcher {
    writer: Arc<dyn SeriesWriter>,
    database: String,
    retention_policy: String,
}

impl PointDispatcher {
    pub fn new(
        writer: Arc<dyn SeriesWriter>,
        database: impl Into<String>,
        retention_policy: impl Into<String>,
    ) -> Self {
        Self {
            writer,
            database: database.into(),
            retention_policy: retention_policy.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn retention_policy(&self) -> &str {
        &self.retention_policy
    }

    /// 写入单个点位，返回是否写入成功。
    pub async fn dispatch(&self, point: Point) -> bool {
        let name = point.name.clone();
        match self
            .writer
            .write_series(&self.database, &self.retention_policy, vec![point])
            .await
        {
            Ok(count) => {
                record_points_written(count);
                true
            }
            Err(err) => {
                record_write_failure();
                warn!(
                    target: "ingest.dispatch",
                    database = %self.database,
                    retention_policy = %self.retention_policy,
                    name = %name,
                    error = %err,
                    "cannot write data"
                );
                false
            }
        }
    }
}
