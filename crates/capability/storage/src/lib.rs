//! # 存储写入接口
//!
//! 接入前端只通过一个窄接口与时序存储交互：
//!
//! - [`SeriesWriter`]：按 `database` / `retention_policy` 写入一批 Point，
//!   返回确认写入的数量或 [`StorageError`]
//! - [`LoggingSeriesWriter`]：只记录日志、不保留点位，接入服务的默认写入目标
//! - [`InMemorySeriesWriter`]：记录每一次写入调用的内存实现，用于测试
//!
//! `retention_policy` 为空字符串表示使用目标库的默认保留策略。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use ingest_storage::{InMemorySeriesWriter, SeriesWriter};
//!
//! let writer = InMemorySeriesWriter::new();
//! writer.write_series("opentsdb", "", vec![point]).await?;
//! assert_eq!(writer.len(), 1);
//! ```

pub mod error;
pub mod in_memory;
pub mod logging;
pub mod traits;

pub use error::StorageError;
pub use in_memory::*;
pub use logging::LoggingSeriesWriter;
pub use traits::*;
