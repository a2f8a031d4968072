//! 错误分析的请求/响应模型与 prompt 模板

use serde::{Deserialize, Serialize};

/// 固定置信度（当前不从模型信号计算）
pub const CONFIDENCE: f64 = 0.85;

/// 没有堆栈时填入 prompt 的占位文本
pub const NO_STACK_PLACEHOLDER: &str = "No stack trace available";

/// POST /analyze-error 请求体
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisRequest {
    /// 调用方提供的标识，原样返回
    pub error_id: String,
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
}

/// POST /analyze-error 响应体
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisResponse {
    pub error_id: String,
    /// 模型返回的 markdown 文本，不做结构校验
    pub suggestion: String,
    pub confidence: f64,
}

impl AnalysisResponse {
    pub fn new(error_id: String, suggestion: String) -> Self {
        Self {
            error_id,
            suggestion,
            confidence: CONFIDENCE,
        }
    }
}

/// 根据错误信息渲染 prompt
///
/// `stack` 为 `None` 或空字符串时使用 [`NO_STACK_PLACEHOLDER`]。
pub fn render_prompt(message: &str, stack: Option<&str>) -> String {
    let stack = stack
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_STACK_PLACEHOLDER);

    format!(
        "\nYou are an expert software engineer analyzing runtime errors.\n\
         \n\
         Error Message:\n\
         {message}\n\
         \n\
         Stack Trace:\n\
         {stack}\n\
         \n\
         Provide:\n\
         1. Root cause (2–3 sentences)\n\
         2. Fix suggestions with code\n\
         3. Prevention best practices\n\
         \n\
         Use markdown. Do NOT wrap your entire response inside ```markdown backticks.\n"
    )
}
