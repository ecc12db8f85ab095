//! OpenTSDB telnet 协议监听
//!
//! 每行一个命令：
//!
//! ```text
//! put sys.cpu.user 1356998400 42.5 host=webserver01 cpu=0
//! version
//! ```
//!
//! 每个连接由独立任务处理，连接内按到达顺序逐行解析并写入。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut server = OpenTsdbServer::new(writer, "opentsdb", "");
//! server.listen_and_serve("0.0.0.0:4242").await?;
//! // ...
//! server.close().await?;
//! ```

use crate::dispatch::PointDispatcher;
use crate::error::{CommandError, ProtocolError};
use crate::types::{Command, PutCommand, MAX_LINE_BYTES, VERSION_RESPONSE};
use domain::{Point, Timestamp};
use ingest_storage::SeriesWriter;
use ingest_telemetry::{
    new_session_id, record_connection_accepted, record_connection_closed, record_line_received,
    record_malformed_line, record_malformed_tags, record_version_request,
};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn, Instrument};

/// 秒级时间戳长度
const SECONDS_LEN: usize = 10;

/// 毫秒级时间戳长度
const MILLIS_LEN: usize = 13;

/// 运行中的监听器状态
struct RunningServer {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

/// OpenTSDB telnet 服务器
pub struct OpenTsdbServer {
    dispatcher: Arc<PointDispatcher>,
    running: Option<RunningServer>,
}

impl OpenTsdbServer {
    /// 创建服务器，所有点位写入 `database` / `retention_policy`
    pub fn new(
        writer: Arc<dyn SeriesWriter>,
        database: impl Into<String>,
        retention_policy: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(PointDispatcher::new(writer, database, retention_policy)),
            running: None,
        }
    }

    /// 已绑定的本地地址（未启动时为 None）
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    /// 绑定地址并在后台启动 accept 循环
    ///
    /// 绑定失败时记录错误并返回，服务不会启动，也不会重试。
    pub async fn listen_and_serve(&mut self, listen_address: &str) -> Result<SocketAddr, ProtocolError> {
        if self.running.is_some() {
            return Err(ProtocolError::AlreadyRunning);
        }

        let listener = match TcpListener::bind(listen_address).await {
            Ok(listener) => listener,
            Err(source) => {
                error!(target: "ingest.opentsdb", address = %listen_address, error = %source, "listen failed");
                return Err(ProtocolError::Bind {
                    address: listen_address.to_string(),
                    source,
                });
            }
        };
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            shutdown_rx,
        ));

        info!(
            target: "ingest.opentsdb",
            address = %local_addr,
            database = %self.dispatcher.database(),
            retention_policy = %self.dispatcher.retention_policy(),
            "opentsdb listener started"
        );

        self.running = Some(RunningServer {
            local_addr,
            shutdown: shutdown_tx,
            accept_task,
        });
        Ok(local_addr)
    }

    /// 停止服务
    ///
    /// 发出关闭信号、关闭监听套接字，并等待所有连接任务退出后才返回。
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };

        let _ = running.shutdown.send(true);
        running
            .accept_task
            .await
            .map_err(|err| ProtocolError::Join(err.to_string()))?;

        info!(target: "ingest.opentsdb", address = %running.local_addr, "opentsdb listener stopped");
        Ok(())
    }
}

/// accept 循环：每个连接交给独立的处理任务
///
/// 连接任务统一放在 JoinSet 中，退出前关闭监听套接字并等待全部连接任务结束。
async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<PointDispatcher>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut handlers = JoinSet::new();

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                if let Err(err) = joined {
                    warn!(target: "ingest.opentsdb", error = %err, "connection task failed");
                }
            }
            result = listener.accept() => match result {
                Ok((stream, peer_addr)) => {
                    record_connection_accepted();
                    let session_id = new_session_id();
                    debug!(target: "ingest.opentsdb", peer = %peer_addr, session_id = %session_id, "new connection");

                    let dispatcher = Arc::clone(&dispatcher);
                    let shutdown = shutdown.clone();
                    let span = tracing::info_span!("opentsdb_session", session_id = %session_id, peer = %peer_addr);
                    handlers.spawn(
                        async move {
                            if let Err(err) = handle_connection(stream, peer_addr, dispatcher, shutdown).await {
                                debug!(target: "ingest.opentsdb", peer = %peer_addr, error = %err, "connection error");
                            }
                            record_connection_closed();
                        }
                        .instrument(span),
                    );
                }
                Err(err) => {
                    warn!(target: "ingest.opentsdb", error = %err, "error accepting");
                }
            }
        }
    }

    drop(listener);

    let open = handlers.len();
    if open > 0 {
        info!(target: "ingest.opentsdb", connections = open, "waiting for connections to close");
    }
    while let Some(joined) = handlers.join_next().await {
        if let Err(err) = joined {
            warn!(target: "ingest.opentsdb", error = %err, "connection task failed");
        }
    }
}

/// 处理单个连接
///
/// 关闭信号只在等待下一行时生效，正在处理的行（包括写入）总会完整结束。
/// 单行超过 [`MAX_LINE_BYTES`] 仍未读到换行时按畸形行记录并断开连接。
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    dispatcher: Arc<PointDispatcher>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ProtocolError> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        if *shutdown.borrow() {
            info!(target: "ingest.opentsdb", peer = %peer_addr, "disconnecting");
            break;
        }

        buf.clear();
        let mut line_reader = (&mut reader).take(MAX_LINE_BYTES as u64);
        let bytes_read = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!(target: "ingest.opentsdb", peer = %peer_addr, "disconnecting");
                break;
            }
            result = line_reader.read_until(b'\n', &mut buf) => result?,
        };

        if bytes_read == 0 {
            debug!(target: "ingest.opentsdb", peer = %peer_addr, "connection closed by peer");
            break;
        }
        if bytes_read == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
            record_malformed_line();
            warn!(
                target: "ingest.opentsdb",
                peer = %peer_addr,
                limit = MAX_LINE_BYTES,
                "line too long, disconnecting"
            );
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        record_line_received();

        match parse_command(line) {
            Ok(Command::Version) => {
                record_version_request();
                write_half.write_all(VERSION_RESPONSE).await?;
            }
            Ok(Command::Put(PutCommand {
                point,
                malformed_tags,
            })) => {
                if !malformed_tags.is_empty() {
                    record_malformed_tags(malformed_tags.len() as u64);
                    for tag in &malformed_tags {
                        warn!(target: "ingest.opentsdb", peer = %peer_addr, tag = %tag, "malformed tag data");
                    }
                }
                dispatcher.dispatch(point).await;
            }
            Err(err) => {
                record_malformed_line();
                warn!(target: "ingest.opentsdb", peer = %peer_addr, error = %err, "line skipped");
            }
        }
    }

    Ok(())
}

/// 解析一行 telnet 命令
///
/// 时间戳或值非法时整行丢弃；单个畸形标签只被忽略，并记录在
/// [`PutCommand::malformed_tags`] 中。
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() == 1 && fields[0] == "version" {
        return Ok(Command::Version);
    }

    if fields.len() < 4 || fields[0] != "put" {
        return Err(CommandError::Malformed(line.to_string()));
    }

    let name = fields[1];
    let timestamp = parse_timestamp(fields[2])?;
    let value = fields[3]
        .parse::<f64>()
        .map_err(|_| CommandError::InvalidValue(fields[3].to_string()))?;

    let mut tags = BTreeMap::new();
    let mut malformed_tags = Vec::new();
    for field in &fields[4..] {
        match parse_tag(field) {
            Ok((key, value)) => {
                tags.insert(key.to_string(), value.to_string());
            }
            Err(_) => malformed_tags.push(field.to_string()),
        }
    }

    Ok(Command::Put(PutCommand {
        point: Point::with_value(name, tags, timestamp, value),
        malformed_tags,
    }))
}

/// 解析时间戳：10 位为秒，13 位为毫秒，其他长度拒绝
pub fn parse_timestamp(text: &str) -> Result<Timestamp, CommandError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidTimestamp(text.to_string()));
    }
    let ts = text
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidTimestamp(text.to_string()))?;

    match text.len() {
        SECONDS_LEN => Ok(Timestamp::from_secs(ts)),
        MILLIS_LEN => Ok(Timestamp::from_millis(ts)),
        _ => Err(CommandError::TimestampLength(text.to_string())),
    }
}

/// 按第一个 `=` 拆分标签
fn parse_tag(field: &str) -> Result<(&str, &str), CommandError> {
    field
        .split_once('=')
        .ok_or_else(|| CommandError::MalformedTag(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::FieldValue;

    fn put(line: &str) -> PutCommand {
        match parse_command(line).expect("parse") {
            Command::Put(put) => put,
            other => panic!("expected put, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_put_with_tags() {
        let cmd = put("put sys.cpu.user 1356998400 42.5 host=webserver01 cpu=0");
        assert_eq!(cmd.point.name, "sys.cpu.user");
        assert_eq!(cmd.point.tags.get("host").map(String::as_str), Some("webserver01"));
        assert_eq!(cmd.point.tags.get("cpu").map(String::as_str), Some("0"));
        assert_eq!(cmd.point.timestamp, Timestamp::from_secs(1_356_998_400));
        assert_eq!(cmd.point.fields.len(), 1);
        assert_eq!(cmd.point.fields.get("value"), Some(&FieldValue::F64(42.5)));
        assert!(cmd.malformed_tags.is_empty());
    }

    #[test]
    fn test_parse_seconds_timestamp() {
        let cmd = put("put cpu 1356998400 1");
        assert_eq!(cmd.point.timestamp.secs, 1_356_998_400);
        assert_eq!(cmd.point.timestamp.nanos, 0);
    }

    #[test]
    fn test_parse_millis_timestamp() {
        let cmd = put("put cpu 1356998400123 1");
        assert_eq!(cmd.point.timestamp.secs, 1_356_998_400);
        assert_eq!(cmd.point.timestamp.subsec_millis(), 123);
    }

    #[test]
    fn test_reject_other_timestamp_lengths() {
        for ts in ["135699840", "13569984001", "135699840012", "13569984001234", "1"] {
            let line = format!("put cpu {} 1", ts);
            assert_eq!(
                parse_command(&line),
                Err(CommandError::TimestampLength(ts.to_string())),
                "timestamp {}",
                ts
            );
        }
    }

    #[test]
    fn test_reject_non_integer_timestamp() {
        // 长度符合也必须整行丢弃
        for ts in ["13569984a0", "-356998400", "1356998400.5"] {
            let line = format!("put cpu {} 1", ts);
            assert_eq!(
                parse_command(&line),
                Err(CommandError::InvalidTimestamp(ts.to_string()))
            );
        }
    }

    #[test]
    fn test_malformed_tag_is_omitted() {
        let cmd = put("put cpu 1356998400 1 host=a broken dc=eu");
        assert_eq!(cmd.point.tags.len(), 2);
        assert!(cmd.point.tags.contains_key("host"));
        assert!(cmd.point.tags.contains_key("dc"));
        assert_eq!(cmd.malformed_tags, vec!["broken".to_string()]);
    }

    #[test]
    fn test_tag_splits_on_first_equals() {
        let cmd = put("put cpu 1356998400 1 query=a=b");
        assert_eq!(cmd.point.tags.get("query").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_reject_invalid_value() {
        assert_eq!(
            parse_command("put cpu 1356998400 abc host=a"),
            Err(CommandError::InvalidValue("abc".to_string()))
        );
    }

    #[test]
    fn test_version_and_malformed_shapes() {
        assert_eq!(parse_command("version"), Ok(Command::Version));
        assert_eq!(parse_command("  version \r"), Ok(Command::Version));
        for line in ["version extra", "put cpu 1356998400", "get cpu 1356998400 1", "PUT cpu 1356998400 1"] {
            assert_eq!(
                parse_command(line),
                Err(CommandError::Malformed(line.to_string())),
                "line {:?}",
                line
            );
        }
    }

    #[test]
    fn test_whitespace_runs_separate_fields() {
        let cmd = put("put\tcpu   1356998400 \t 7.25   host=a");
        assert_eq!(cmd.point.name, "cpu");
        assert_eq!(cmd.point.value(), Some(7.25));
        assert_eq!(cmd.point.tags.len(), 1);
    }
}
