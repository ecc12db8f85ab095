//! 存储接口 Trait 定义

use crate::error::StorageError;
use async_trait::async_trait;
use domain::Point;

/// 时序写入接口
///
/// 实现方需要支持多个任务并发调用，接入层不会对调用做串行化。
#[async_trait]
pub trait SeriesWriter: Send + Sync {
    /// 写入一批点位，返回确认写入的数量。
    ///
    /// `retention_policy` 为空表示目标库默认保留策略。
    async fn write_series(
        &self,
        database: &str,
        retention_policy: &str,
        points: Vec<Point>,
    ) -> Result<u64, StorageError>;
}
