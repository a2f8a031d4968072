//! Gemini 模型客户端
//!
//! 负责对 generateContent 的唯一一次外部调用：构造请求、限时发送、
//! 从响应信封中取出生成文本。不做重试。

mod envelope;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::Config;
use envelope::{extract_text, GenerateContentRequest};

/// 单次调用超时（连接 + 响应）
pub const MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// 模型调用错误
///
/// 仅用于日志区分；HTTP 边界上统一折叠为 500。
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("request to Gemini timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// 非 200 状态，Display 为上游原始响应体
    #[error("{body}")]
    Status { status: StatusCode, body: String },

    #[error("{0}")]
    Envelope(String),
}

impl ModelError {
    /// 日志中使用的错误类别
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::Transport(_) => "transport",
            ModelError::Timeout(_) => "timeout",
            ModelError::Status { .. } => "upstream_status",
            ModelError::Envelope(_) => "malformed_envelope",
        }
    }

    /// 上游返回的 HTTP 状态码（仅 `Status`）
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ModelError::Status { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }
}

/// 模型客户端接口：输入 prompt，返回生成文本
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// 模型名称（用于日志）
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

/// 基于 REST 的 Gemini 客户端
///
/// 内部的 `reqwest::Client` 在请求间共享，连接池由 reqwest 管理。
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeout(config, MODEL_TIMEOUT)
    }

    /// 使用自定义超时创建客户端
    pub fn with_timeout(config: &Config, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);

        if config.disable_tls_verify {
            tracing::warn!("TLS certificate verification is DISABLED - for debugging only!");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to create Gemini HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.gemini_base_url, config.gemini_model
            ),
            api_key: config.google_api_key.clone(),
            model: config.gemini_model.clone(),
            timeout,
        })
    }

    // URL 中带有 API key，不能出现在错误信息里
    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::Transport(err.without_url())
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            return Err(ModelError::Status { status, body });
        }

        let text = extract_text(&body)?;

        tracing::info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "generated"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn test_config(server: &MockServer) -> Config {
        let base_url = server.uri();
        Config::from_lookup(move |key| match key {
            "GOOGLE_API_KEY" => Some("test-key".to_string()),
            "ERRLENS_GEMINI_BASE_URL" => Some(base_url.clone()),
            _ => None,
        })
        .unwrap()
    }

    fn candidate(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
    }

    #[tokio::test]
    async fn sends_prompt_with_key_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({"contents": [{"parts": [{"text": "why?"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Root cause: ...")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(&server)).unwrap();
        assert_eq!(client.model(), "gemini-2.5-flash");
        assert_eq!(client.generate("why?").await.unwrap(), "Root cause: ...");
    }

    #[tokio::test]
    async fn non_200_carries_raw_body() {
        let server = MockServer::start().await;
        let upstream = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string(upstream))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(&server)).unwrap();
        let err = client.generate("p").await.unwrap_err();

        assert_eq!(err.kind(), "upstream_status");
        assert_eq!(err.upstream_status(), Some(400));
        assert_eq!(err.to_string(), upstream);
    }

    #[tokio::test]
    async fn other_success_codes_are_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_json(candidate("late")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(&server)).unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert_eq!(err.kind(), "upstream_status");
    }

    #[tokio::test]
    async fn missing_candidates_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {}})))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&test_config(&server)).unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert_eq!(err.kind(), "malformed_envelope");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate("too late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client =
            GeminiClient::with_timeout(&test_config(&server), Duration::from_millis(200)).unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_api_key() {
        let config = Config::from_lookup(|key| match key {
            "GOOGLE_API_KEY" => Some("leaky-key".to_string()),
            // 无监听的端口
            "ERRLENS_GEMINI_BASE_URL" => Some("http://127.0.0.1:9".to_string()),
            _ => None,
        })
        .unwrap();

        let client = GeminiClient::new(&config).unwrap();
        let err = client.generate("p").await.unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert!(!err.to_string().contains("leaky-key"));
    }
}
