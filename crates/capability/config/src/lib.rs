//! 接入服务运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// Graphite 路径中指标名所在的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePosition {
    /// `name.k1.v1.k2.v2`
    #[default]
    First,
    /// `k1.v1.k2.v2.name`
    Last,
}

/// OpenTSDB telnet 监听配置。
#[derive(Debug, Clone)]
pub struct OpenTsdbConfig {
    pub enabled: bool,
    pub bind_addr: String,
    pub database: String,
    pub retention_policy: String,
}

/// Graphite UDP 监听配置。
#[derive(Debug, Clone)]
pub struct GraphiteConfig {
    pub enabled: bool,
    pub bind_addr: String,
    pub database: String,
    pub separator: String,
    pub name_position: NamePosition,
}

/// 接入服务运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub opentsdb: OpenTsdbConfig,
    pub graphite: GraphiteConfig,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("INGEST_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8089".to_string());

        let opentsdb = OpenTsdbConfig {
            enabled: read_bool_with_default("INGEST_OPENTSDB_ENABLED", true)?,
            bind_addr: env::var("INGEST_OPENTSDB_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:4242".to_string()),
            database: env::var("INGEST_OPENTSDB_DATABASE")
                .unwrap_or_else(|_| "opentsdb".to_string()),
            retention_policy: env::var("INGEST_OPENTSDB_RETENTION_POLICY").unwrap_or_default(),
        };

        let separator = env::var("INGEST_GRAPHITE_SEPARATOR").unwrap_or_else(|_| ".".to_string());
        if separator.is_empty() {
            return Err(ConfigError::Invalid(
                "INGEST_GRAPHITE_SEPARATOR".to_string(),
                separator,
            ));
        }
        let graphite = GraphiteConfig {
            enabled: read_bool_with_default("INGEST_GRAPHITE_ENABLED", true)?,
            bind_addr: env::var("INGEST_GRAPHITE_UDP_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:2003".to_string()),
            database: env::var("INGEST_GRAPHITE_DATABASE")
                .unwrap_or_else(|_| "graphite".to_string()),
            separator,
            name_position: read_name_position("INGEST_GRAPHITE_NAME_POSITION")?,
        };

        Ok(Self {
            http_addr,
            opentsdb,
            graphite,
        })
    }
}

fn read_bool_with_default(key: &str, default: bool) -> Result<bool, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}

fn read_name_position(key: &str) -> Result<NamePosition, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(NamePosition::default()),
    };
    match value.to_ascii_lowercase().as_str() {
        "first" => Ok(NamePosition::First),
        "last" => Ok(NamePosition::Last),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}
