#![allow(dead_code)]

use async_trait::async_trait;
use domain::Point;
use ingest_storage::{InMemorySeriesWriter, SeriesWriter, StorageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// 轮询等待写入次数达到预期。
pub async fn wait_for_writes(writer: &InMemorySeriesWriter, expected: usize) {
    for _ in 0..300 {
        if writer.len() >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} writes, got {}", expected, writer.len());
}

/// 名称匹配时写入失败，其余委托给内存写入器。
pub struct RejectingWriter {
    pub reject_name: String,
    pub inner: InMemorySeriesWriter,
}

impl RejectingWriter {
    pub fn new(reject_name: &str) -> Self {
        Self {
            reject_name: reject_name.to_string(),
            inner: InMemorySeriesWriter::new(),
        }
    }
}

#[async_trait]
impl SeriesWriter for RejectingWriter {
    async fn write_series(
        &self,
        database: &str,
        retention_policy: &str,
        points: Vec<Point>,
    ) -> Result<u64, StorageError> {
        if points.iter().any(|point| point.name == self.reject_name) {
            return Err(StorageError::new("rejected by test writer"));
        }
        self.inner
            .write_series(database, retention_policy, points)
            .await
    }
}

/// 每次写入前等待固定时长，其余委托给内存写入器。
pub struct SlowWriter {
    pub delay: Duration,
    pub started: AtomicUsize,
    pub inner: InMemorySeriesWriter,
}

impl SlowWriter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: AtomicUsize::new(0),
            inner: InMemorySeriesWriter::new(),
        }
    }

    /// 轮询等待至少一次写入已开始。
    pub async fn wait_for_start(&self) {
        for _ in 0..300 {
            if self.started.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("write never started");
    }
}

#[async_trait]
impl SeriesWriter for SlowWriter {
    async fn write_series(
        &self,
        database: &str,
        retention_policy: &str,
        points: Vec<Point>,
    ) -> Result<u64, StorageError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner
            .write_series(database, retention_policy, points)
            .await
    }
}
