//! Graphite 明文行解析
//!
//! 行格式：`<path> <value> <timestamp>`。路径按分隔符拆分，段数必须为奇数：
//! 一段为指标名，其余两两组成标签，例如 `cpu.host.server01`。

use crate::error::ParseError;
use crate::types::GRAPHITE_DEFAULT_SEPARATOR;
use domain::{Point, Timestamp};
use std::collections::BTreeMap;

/// 行解析器：一行文本到 Point 的纯函数
pub trait LineParser: Send + Sync {
    fn parse(&self, line: &str) -> Result<Point, ParseError>;
}

/// Graphite 行解析器
#[derive(Debug, Clone)]
pub struct GraphiteParser {
    separator: String,
    last_enabled: bool,
}

impl GraphiteParser {
    /// `last_enabled` 为 true 时取路径最后一段为指标名，否则取第一段。
    ///
    /// 空分隔符回退为 `.`。
    pub fn new(separator: impl Into<String>, last_enabled: bool) -> Self {
        let separator = separator.into();
        let separator = if separator.is_empty() {
            GRAPHITE_DEFAULT_SEPARATOR.to_string()
        } else {
            separator
        };
        Self {
            separator,
            last_enabled,
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// 从路径中解析指标名与标签
    pub fn decode_name_and_tags(
        &self,
        path: &str,
    ) -> Result<(String, BTreeMap<String, String>), ParseError> {
        let mut values: Vec<&str> = path.split(self.separator.as_str()).collect();
        if values.len() % 2 != 1 {
            return Err(ParseError::PathShape(path.to_string()));
        }

        // 段数为奇数，至少一段
        let name = if self.last_enabled {
            values.pop().unwrap_or_default()
        } else {
            values.remove(0)
        };
        if name.is_empty() {
            return Err(ParseError::EmptyName(path.to_string()));
        }

        let tags = values
            .chunks_exact(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();
        Ok((name.to_string(), tags))
    }
}

impl Default for GraphiteParser {
    fn default() -> Self {
        Self::new(GRAPHITE_DEFAULT_SEPARATOR, false)
    }
}

impl LineParser for GraphiteParser {
    fn parse(&self, line: &str) -> Result<Point, ParseError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ParseError::FieldCount(line.to_string()));
        }

        let (name, tags) = self.decode_name_and_tags(fields[0])?;

        let value = fields[1]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidValue(fields[1].to_string()))?;

        let timestamp = parse_unix_seconds(fields[2])?;

        Ok(Point::with_value(name, tags, timestamp, value))
    }
}

/// 解析可带小数的 Unix 秒
fn parse_unix_seconds(text: &str) -> Result<Timestamp, ParseError> {
    let unix = text
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidTimestamp(text.to_string()))?;
    if !unix.is_finite() || unix < 0.0 || unix >= i64::MAX as f64 {
        return Err(ParseError::InvalidTimestamp(text.to_string()));
    }
    let secs = unix.trunc();
    let nanos = ((unix - secs) * 1e9).round() as u32;
    Ok(Timestamp::new(secs as i64, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_first() {
        let parser = GraphiteParser::default();
        let point = parser.parse("cpu.host.server01 12.5 1356998400").unwrap();
        assert_eq!(point.name, "cpu");
        assert_eq!(point.tags.get("host").map(String::as_str), Some("server01"));
        assert_eq!(point.value(), Some(12.5));
        assert_eq!(point.timestamp, Timestamp::from_secs(1_356_998_400));
    }

    #[test]
    fn test_parse_name_last() {
        let parser = GraphiteParser::new(".", true);
        let point = parser
            .parse("region.us-west.hostname.server01.cpu 1 1356998400")
            .unwrap();
        assert_eq!(point.name, "cpu");
        assert_eq!(point.tags.len(), 2);
        assert_eq!(point.tags.get("region").map(String::as_str), Some("us-west"));
        assert_eq!(point.tags.get("hostname").map(String::as_str), Some("server01"));
    }

    #[test]
    fn test_plain_name_without_tags() {
        let point = GraphiteParser::default().parse("loadavg 0.5 1356998400").unwrap();
        assert_eq!(point.name, "loadavg");
        assert!(point.tags.is_empty());
    }

    #[test]
    fn test_custom_separator() {
        let parser = GraphiteParser::new("_", false);
        let point = parser.parse("cpu_host_a 1 1356998400").unwrap();
        assert_eq!(point.name, "cpu");
        assert_eq!(point.tags.get("host").map(String::as_str), Some("a"));
        assert_eq!(GraphiteParser::new("", false).separator(), ".");
    }

    #[test]
    fn test_fractional_timestamp() {
        let point = GraphiteParser::default().parse("cpu 1 1356998400.5").unwrap();
        assert_eq!(point.timestamp.secs, 1_356_998_400);
        assert_eq!(point.timestamp.subsec_millis(), 500);
    }

    #[test]
    fn test_parse_errors() {
        let parser = GraphiteParser::default();
        assert!(matches!(parser.parse("cpu 1"), Err(ParseError::FieldCount(_))));
        assert!(matches!(parser.parse(""), Err(ParseError::FieldCount(_))));
        assert!(matches!(
            parser.parse("cpu.host 1 1356998400"),
            Err(ParseError::PathShape(_))
        ));
        assert!(matches!(
            parser.parse(".host.a 1 1356998400"),
            Err(ParseError::EmptyName(_))
        ));
        assert!(matches!(
            parser.parse("cpu abc 1356998400"),
            Err(ParseError::InvalidValue(_))
        ));
        assert!(matches!(
            parser.parse("cpu 1 yesterday"),
            Err(ParseError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            parser.parse("cpu 1 -5"),
            Err(ParseError::InvalidTimestamp(_))
        ));
    }
}
