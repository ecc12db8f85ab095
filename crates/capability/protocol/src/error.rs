//! 协议错误类型定义

/// 监听器生命周期错误
///
/// 只有启动阶段的错误会返回给调用方，行级与点级错误都在监听器内部消化。
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 未指定监听地址
    #[error("bind address required")]
    BindAddressRequired,

    /// 地址解析或绑定失败
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    /// 重复启动
    #[error("listener already running")]
    AlreadyRunning,

    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 后台任务异常退出
    #[error("task join error: {0}")]
    Join(String),
}

/// OpenTSDB 命令行解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("malformed line, skipping: {0}")]
    Malformed(String),

    #[error("malformed timestamp, skipping: {0}")]
    InvalidTimestamp(String),

    #[error("timestamp must be 10 or 13 chars, skipping: {0}")]
    TimestampLength(String),

    #[error("could not parse value as float: {0}")]
    InvalidValue(String),

    /// 单个标签缺少 `=`，只丢弃该标签
    #[error("malformed tag data: {0}")]
    MalformedTag(String),
}

/// 行协议解析错误（Graphite 明文）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("received {0:?} which doesn't have three fields")]
    FieldCount(String),

    #[error("received {0:?} which doesn't conform to format of key.value.key.value.name or name")]
    PathShape(String),

    #[error("no name specified for metric: {0:?}")]
    EmptyName(String),

    #[error("invalid value: {0:?}")]
    InvalidValue(String),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}
