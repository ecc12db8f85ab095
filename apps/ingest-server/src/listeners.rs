//! 监听器装配模块
//!
//! 根据配置创建 OpenTSDB 与 Graphite 监听器，共用同一个存储写入接口。

use ingest_config::{AppConfig, NamePosition};
use ingest_protocol::{GraphiteParser, GraphiteUdpServer, OpenTsdbServer, ProtocolError};
use ingest_storage::SeriesWriter;
use std::sync::Arc;
use tracing::info;

/// 已启动的监听器集合
pub struct Listeners {
    opentsdb: Option<OpenTsdbServer>,
    graphite: Option<GraphiteUdpServer>,
}

impl Listeners {
    /// 依次关闭所有监听器，返回第一个错误
    pub async fn close(&mut self) -> Result<(), ProtocolError> {
        let mut result = Ok(());
        if let Some(server) = self.opentsdb.as_mut() {
            if let Err(err) = server.close().await {
                result = Err(err);
            }
        }
        if let Some(server) = self.graphite.as_mut() {
            if let Err(err) = server.close().await {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}

/// 启动配置中启用的监听器
///
/// 任一监听器绑定失败时，已启动的监听器会先关闭，再返回错误。
pub async fn start_listeners(
    config: &AppConfig,
    writer: Arc<dyn SeriesWriter>,
) -> Result<Listeners, ProtocolError> {
    let mut listeners = Listeners {
        opentsdb: None,
        graphite: None,
    };

    if config.opentsdb.enabled {
        let mut server = OpenTsdbServer::new(
            Arc::clone(&writer),
            config.opentsdb.database.clone(),
            config.opentsdb.retention_policy.clone(),
        );
        server.listen_and_serve(&config.opentsdb.bind_addr).await?;
        listeners.opentsdb = Some(server);
    } else {
        info!("opentsdb listener disabled");
    }

    if config.graphite.enabled {
        let parser = GraphiteParser::new(
            config.graphite.separator.clone(),
            config.graphite.name_position == NamePosition::Last,
        );
        let mut server = GraphiteUdpServer::new(
            Arc::new(parser),
            Arc::clone(&writer),
            config.graphite.database.clone(),
        );
        if let Err(err) = server.listen_and_serve(&config.graphite.bind_addr).await {
            let _ = listeners.close().await;
            return Err(err);
        }
        listeners.graphite = Some(server);
    } else {
        info!("graphite listener disabled");
    }

    Ok(listeners)
}
