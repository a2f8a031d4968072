//! 错误分析处理器

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::analysis::{render_prompt, AnalysisRequest, AnalysisResponse};
use crate::gateway::{handlers::error_response, state::AppState};

/// POST /analyze-error 处理器
///
/// 模型调用的任何失败都以 500 返回，`detail` 为原始错误信息。
pub async fn handle_analyze_error(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(reason = %rejection.body_text(), "rejected request body");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let model = state.model();

    tracing::info!(
        error_id = %request.error_id,
        model = model.model(),
        has_stack = request.stack.is_some(),
        "request"
    );

    let prompt = render_prompt(&request.message, request.stack.as_deref());

    match model.generate(&prompt).await {
        Ok(suggestion) => Json(AnalysisResponse::new(request.error_id, suggestion)).into_response(),
        Err(err) => {
            tracing::error!(
                error_id = %request.error_id,
                kind = err.kind(),
                upstream_status = err.upstream_status(),
                error = %err,
                "Gemini call failed"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
