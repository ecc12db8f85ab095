//! 内存存储实现模块
//!
//! 仅用于测试。

pub mod series;

pub use series::*;
