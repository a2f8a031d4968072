//! HTTP 请求处理器

pub mod analyze;
pub mod health;

pub use analyze::handle_analyze_error;
pub use health::handle_health;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// 错误响应体，与调用方已有的 `{"detail": ...}` 格式一致
#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

fn error_response(status: StatusCode, detail: String) -> axum::response::Response {
    (status, Json(ErrorResponse { detail })).into_response()
}
