use std::collections::BTreeMap;
use std::fmt;

/// 纳秒/秒。
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// 绝对时间点（相对 Unix epoch）。
///
/// `nanos` 始终小于 1 秒，秒级输入的 `nanos` 为 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl Timestamp {
    /// 秒级时间戳。
    pub fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    /// 毫秒级时间戳，拆分为整秒与亚秒余数。
    pub fn from_millis(millis: i64) -> Self {
        let secs = millis.div_euclid(1000);
        let rem_ms = millis.rem_euclid(1000) as u32;
        Self {
            secs,
            nanos: rem_ms * 1_000_000,
        }
    }

    /// 由整秒与纳秒构造，纳秒溢出部分进位到秒。
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs + i64::from(nanos / NANOS_PER_SEC),
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    pub fn subsec_millis(&self) -> u32 {
        self.nanos / 1_000_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            write!(f, "{}", self.secs)
        } else {
            write!(f, "{}.{:09}", self.secs, self.nanos)
        }
    }
}

/// 字段值。两种行协议都只产生浮点值。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    F64(f64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::F64(value) => *value,
        }
    }
}

/// 规范化后的时序点。
///
/// 只有在时间戳与值都解析成功后才会构造，不存在半填充的 Point。
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    pub timestamp: Timestamp,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Point {
    /// 单值点位：`fields` 仅包含 `value` 一个键。
    pub fn with_value(
        name: impl Into<String>,
        tags: BTreeMap<String, String>,
        timestamp: Timestamp,
        value: f64,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("value".to_string(), FieldValue::F64(value));
        Self {
            name: name.into(),
            tags,
            timestamp,
            fields,
        }
    }

    /// 序列键：名称加排序后的标签，标识一条逻辑时序。
    pub fn series_key(&self) -> String {
        let mut key = self.name.clone();
        for (k, v) in &self.tags {
            key.push(',');
            key.push_str(k);
            key.push('=');
            key.push_str(v);
        }
        key
    }

    pub fn value(&self) -> Option<f64> {
        self.fields.get("value").map(FieldValue::as_f64)
    }
}
