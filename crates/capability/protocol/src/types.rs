//! 协议相关类型定义

use domain::Point;

/// `version` 命令的固定响应（不带换行）
pub const VERSION_RESPONSE: &[u8] = b"InfluxDB TSDB proxy";

/// Graphite 默认路径分隔符
pub const GRAPHITE_DEFAULT_SEPARATOR: &str = ".";

/// telnet 单行最大字节数（含换行），超出后断开连接
pub const MAX_LINE_BYTES: usize = 65536;

/// UDP 单个数据报的最大读取长度（64 KiB）
pub const UDP_BUFFER_SIZE: usize = 65536;

/// 一行 OpenTSDB telnet 命令的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `version`：回写固定标识，不产生点位
    Version,
    /// `put <name> <timestamp> <value> [<key>=<value> ...]`
    Put(PutCommand),
}

/// 解析成功的 `put` 命令
#[derive(Debug, Clone, PartialEq)]
pub struct PutCommand {
    pub point: Point,
    /// 缺少 `=` 而被忽略的标签原文
    pub malformed_tags: Vec<String>,
}
