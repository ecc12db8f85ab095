//! 管理端口路由
//!
//! - GET /health
//! - GET /metrics：接入指标快照

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use ingest_telemetry::{metrics, new_request_id};
use tracing::Instrument;

/// 创建管理端口路由
pub fn create_admin_router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        // 注入 request_id
        .layer(middleware::from_fn(request_context))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn get_metrics() -> impl IntoResponse {
    Json(metrics().snapshot())
}

async fn request_context(req: Request<Body>, next: Next) -> Response {
    let request_id = new_request_id();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
