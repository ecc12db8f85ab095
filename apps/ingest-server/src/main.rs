//! 时序数据接入服务：OpenTSDB telnet + Graphite UDP 监听与管理端口。

mod listeners;
mod routes;

use ingest_config::AppConfig;
use ingest_storage::{LoggingSeriesWriter, SeriesWriter};
use ingest_telemetry::init_tracing;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // 存储写入接口：默认只记录日志，不保留点位
    let writer: Arc<dyn SeriesWriter> = Arc::new(LoggingSeriesWriter::new());

    let mut listeners = listeners::start_listeners(&config, writer).await?;

    // 管理端口：健康检查与指标
    let app = routes::create_admin_router();
    let http = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(address = %config.http_addr, "admin http listening");

    axum::serve(http, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down listeners");
    if let Err(err) = listeners.close().await {
        error!(error = %err, "listener shutdown failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for ctrl-c");
    }
}
