//! 时序数据接入的核心领域模型。

pub mod data;

pub use data::{FieldValue, Point, Timestamp};
