//! 追踪、接入指标与会话 ID 生成。

use serde::Serialize;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 接入指标快照。
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    pub connections_accepted: u64,
    pub connections_closed: u64,
    pub lines_received: u64,
    pub version_requests: u64,
    pub malformed_lines: u64,
    pub malformed_tags: u64,
    pub datagrams_received: u64,
    pub lines_dropped: u64,
    pub points_written: u64,
    pub write_failures: u64,
}

/// 接入指标。
pub struct IngestMetrics {
    connections_accepted: AtomicU64,
    connections_closed: AtomicU64,
    lines_received: AtomicU64,
    version_requests: AtomicU64,
    malformed_lines: AtomicU64,
    malformed_tags: AtomicU64,
    datagrams_received: AtomicU64,
    lines_dropped: AtomicU64,
    points_written: AtomicU64,
    write_failures: AtomicU64,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            connections_accepted: AtomicU64::new(0),
            connections_closed: AtomicU64::new(0),
            lines_received: AtomicU64::new(0),
            version_requests: AtomicU64::new(0),
            malformed_lines: AtomicU64::new(0),
            malformed_tags: AtomicU64::new(0),
            datagrams_received: AtomicU64::new(0),
            lines_dropped: AtomicU64::new(0),
            points_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            lines_received: self.lines_received.load(Ordering::Relaxed),
            version_requests: self.version_requests.load(Ordering::Relaxed),
            malformed_lines: self.malformed_lines.load(Ordering::Relaxed),
            malformed_tags: self.malformed_tags.load(Ordering::Relaxed),
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            points_written: self.points_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<IngestMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static IngestMetrics {
    METRICS.get_or_init(IngestMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的连接会话 ID，用于日志关联。
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 生成新的 request_id（管理端口）。
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录接受的 TCP 连接数。
pub fn record_connection_accepted() {
    metrics()
        .connections_accepted
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录关闭的 TCP 连接数。
pub fn record_connection_closed() {
    metrics().connections_closed.fetch_add(1, Ordering::Relaxed);
}

/// 记录读取的行数（TCP 与 UDP 合计）。
pub fn record_line_received() {
    metrics().lines_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录 version 命令次数。
pub fn record_version_request() {
    metrics().version_requests.fetch_add(1, Ordering::Relaxed);
}

/// 记录被丢弃的畸形命令行。
pub fn record_malformed_line() {
    metrics().malformed_lines.fetch_add(1, Ordering::Relaxed);
}

/// 记录被忽略的畸形标签。
pub fn record_malformed_tags(count: u64) {
    metrics().malformed_tags.fetch_add(count, Ordering::Relaxed);
}

/// 记录收到的 UDP 数据报。
pub fn record_datagram_received() {
    metrics().datagrams_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录解析失败而静默丢弃的 UDP 行。
pub fn record_line_dropped() {
    metrics().lines_dropped.fetch_add(1, Ordering::Relaxed);
}

/// 记录写入成功的点位数。
pub fn record_points_written(count: u64) {
    metrics().points_written.fetch_add(count, Ordering::Relaxed);
}

/// 记录写入失败次数。
pub fn record_write_failure() {
    metrics().write_failures.fetch_add(1, Ordering::Relaxed);
}
