//! 时序写入内存实现

use crate::error::StorageError;
use crate::logging::log_points;
use crate::traits::SeriesWriter;
use domain::Point;
use std::sync::RwLock;

/// 一次写入调用的记录。
#[derive(Debug, Clone, PartialEq)]
pub struct WriteCall {
    pub database: String,
    pub retention_policy: String,
    pub points: Vec<Point>,
}

/// 内存时序写入器
///
/// 记录每一次 `write_series` 调用且从不释放，只用于测试；设置失败原因后所有写入都返回错误。
pub struct InMemorySeriesWriter {
    calls: RwLock<Vec<WriteCall>>,
    failure: RwLock<Option<String>>,
}

impl InMemorySeriesWriter {
    /// 创建新的内存写入器
    pub fn new() -> Self {
        Self {
            calls: RwLock::new(Vec::new()),
            failure: RwLock::new(None),
        }
    }

    /// 后续写入全部失败（用于测试写入失败路径）
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(message.into());
        }
    }

    /// 恢复正常写入
    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = None;
        }
    }

    /// 已成功记录的写入调用
    pub fn calls(&self) -> Vec<WriteCall> {
        self.calls.read().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// 所有已写入的点位（按写入顺序展开）
    pub fn points(&self) -> Vec<Point> {
        self.calls()
            .into_iter()
            .flat_map(|call| call.points)
            .collect()
    }

    /// 写入调用次数
    pub fn len(&self) -> usize {
        self.calls.read().map(|calls| calls.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySeriesWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SeriesWriter for InMemorySeriesWriter {
    async fn write_series(
        &self,
        database: &str,
        retention_policy: &str,
        points: Vec<Point>,
    ) -> Result<u64, StorageError> {
        let failure = self
            .failure
            .read()
            .map_err(|_| StorageError::new("lock failed"))?
            .clone();
        if let Some(message) = failure {
            return Err(StorageError::new(message));
        }
        let count = points.len() as u64;
        log_points(database, retention_policy, &points);
        let mut calls = self
            .calls
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        calls.push(WriteCall {
            database: database.to_string(),
            retention_policy: retention_policy.to_string(),
            points,
        });
        Ok(count)
    }
}
