//! 健康检查处理器

use axum::Json;
use serde::Serialize;

/// 对外报告的模型名，与实际调用的模型不同，保留以兼容现有调用方
pub const HEALTH_MODEL: &str = "gemini-1.5-flash";

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model: &'static str,
}

/// GET /health
///
/// 固定返回，不探测上游可用性
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: HEALTH_MODEL,
    })
}
