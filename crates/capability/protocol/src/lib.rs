//! # 协议接入能力模块
//!
//! 接收两种外部行协议，规范化为 [`domain::Point`] 后写入 [`ingest_storage::SeriesWriter`]：
//! - **OpenTSDB telnet**（TCP）：`put <name> <timestamp> <value> [k=v ...]` 与 `version`
//! - **Graphite 明文**（UDP）：`<path> <value> <timestamp>`，每个数据报可含多行
//!
//! ## 架构设计
//!
//! ```text
//! OpenTsdbServer                    GraphiteUdpServer
//!   accept 循环                        接收循环
//!     │ 每连接一个任务                    │ 按 \n 拆行
//!     ▼                                  ▼
//!   parse_command                      LineParser (GraphiteParser)
//!     │                                  │
//!     └──────────────┬───────────────────┘
//!                    ▼
//!             PointDispatcher
//!                    │ 单点批次，失败只记录不重试
//!                    ▼
//!              SeriesWriter
//! ```
//!
//! ## 错误处理
//!
//! 只有启动阶段（地址为空、绑定失败）的错误返回给调用方。行级错误：TCP 侧记录
//! warn 日志，UDP 侧静默丢弃；写入失败记录 warn 日志后继续处理下一行。

mod dispatch;
mod error;
mod graphite_parser;
mod graphite_udp;
mod opentsdb;
mod types;

pub use dispatch::PointDispatcher;
pub use error::{CommandError, ParseError, ProtocolError};
pub use graphite_parser::{GraphiteParser, LineParser};
pub use graphite_udp::{process_datagram, GraphiteUdpServer};
pub use opentsdb::{parse_command, parse_timestamp, OpenTsdbServer};
pub use types::*;
