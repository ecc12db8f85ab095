//! Graphite UDP 监听
//!
//! 每个数据报按 `\n` 拆成多行，逐行交给 [`LineParser`]。解析失败静默丢弃，
//! 解析成功的点位写入目标库的默认保留策略（空字符串）。

use crate::dispatch::PointDispatcher;
use crate::error::ProtocolError;
use crate::graphite_parser::LineParser;
use crate::types::UDP_BUFFER_SIZE;
use ingest_storage::SeriesWriter;
use ingest_telemetry::{record_datagram_received, record_line_dropped, record_line_received};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

struct RunningReceiver {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Graphite UDP 服务器
pub struct GraphiteUdpServer {
    parser: Arc<dyn LineParser>,
    dispatcher: Arc<PointDispatcher>,
    running: Option<RunningReceiver>,
}

impl GraphiteUdpServer {
    pub fn new(
        parser: Arc<dyn LineParser>,
        writer: Arc<dyn SeriesWriter>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            dispatcher: Arc::new(PointDispatcher::new(writer, database, "")),
            running: None,
        }
    }

    /// 绑定 UDP 地址并启动后台接收任务，不阻塞调用方
    ///
    /// `iface` 必须是 `host:port` 形式，空字符串直接返回配置错误。
    pub async fn listen_and_serve(&mut self, iface: &str) -> Result<SocketAddr, ProtocolError> {
        if iface.is_empty() {
            return Err(ProtocolError::BindAddressRequired);
        }
        if self.running.is_some() {
            return Err(ProtocolError::AlreadyRunning);
        }

        let socket = match UdpSocket::bind(iface).await {
            Ok(socket) => socket,
            Err(source) => {
                error!(target: "ingest.graphite", address = %iface, error = %source, "listen failed");
                return Err(ProtocolError::Bind {
                    address: iface.to_string(),
                    source,
                });
            }
        };
        let local_addr = socket.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(receive_loop(
            socket,
            Arc::clone(&self.parser),
            Arc::clone(&self.dispatcher),
            shutdown_rx,
        ));

        info!(
            target: "ingest.graphite",
            address = %local_addr,
            database = %self.dispatcher.database(),
            "graphite udp listener started"
        );

        self.running = Some(RunningReceiver {
            local_addr,
            shutdown: shutdown_tx,
            task,
        });
        Ok(local_addr)
    }

    /// 已绑定的本地地址，未启动时为空字符串
    pub fn host(&self) -> String {
        self.running
            .as_ref()
            .map(|running| running.local_addr.to_string())
            .unwrap_or_default()
    }

    /// 停止接收：通知后台任务释放套接字并等待其退出
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        let _ = running.shutdown.send(true);
        running
            .task
            .await
            .map_err(|err| ProtocolError::Join(err.to_string()))?;
        info!(target: "ingest.graphite", address = %running.local_addr, "graphite udp listener stopped");
        Ok(())
    }
}

async fn receive_loop(
    socket: UdpSocket,
    parser: Arc<dyn LineParser>,
    dispatcher: Arc<PointDispatcher>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; UDP_BUFFER_SIZE];

    loop {
        let n = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((n, _)) => n,
                Err(err) => {
                    debug!(target: "ingest.graphite", error = %err, "udp read failed, receiver exiting");
                    break;
                }
            },
        };

        record_datagram_received();
        process_datagram(&buf[..n], parser.as_ref(), &dispatcher).await;
    }
}

/// 处理一个数据报，返回写入成功的点位数
pub async fn process_datagram(
    payload: &[u8],
    parser: &dyn LineParser,
    dispatcher: &PointDispatcher,
) -> usize {
    let text = String::from_utf8_lossy(payload);
    let mut written = 0;

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        record_line_received();

        let point = match parser.parse(line) {
            Ok(point) => point,
            Err(err) => {
                record_line_dropped();
                debug!(target: "ingest.graphite", error = %err, "line dropped");
                continue;
            }
        };

        if dispatcher.dispatch(point).await {
            written += 1;
        }
    }

    written
}
