//! 应用配置模块
//!
//! 负责从环境变量加载应用配置，包括：
//! - 服务器监听地址和端口
//! - Gemini API 密钥、地址和模型
//! - 允许跨域访问的前端 Origin

use anyhow::{Context, Result};
use http::{HeaderValue, Uri};

/// Gemini REST API 默认地址
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 实际调用的模型
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// 默认允许的前端 Origin
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// 服务监听地址
///
/// `test` 命令只需要这部分配置，不要求 API 密钥
#[derive(Debug, Clone)]
pub struct ListenAddr {
    /// 服务器监听地址（如 "0.0.0.0" 或 "127.0.0.1"）
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

impl ListenAddr {
    /// 从 `ERRLENS_HOST` / `ERRLENS_PORT` 加载（默认 "0.0.0.0":8000）
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("ERRLENS_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("ERRLENS_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .context("ERRLENS_PORT must be a valid port number")?;

        Ok(Self { host, port })
    }

    /// 本地服务地址，供 `test` 命令使用
    pub fn local_url(&self, path: &str) -> String {
        let host = if self.host == "0.0.0.0" {
            "127.0.0.1"
        } else {
            self.host.as_str()
        };
        format!("http://{}:{}{}", host, self.port, path)
    }
}

/// 解析 CORS Origin，只接受 `scheme://host[:port]`
fn parse_origin(raw: &str) -> Result<HeaderValue> {
    let uri: Uri = raw
        .parse()
        .with_context(|| format!("ERRLENS_ALLOWED_ORIGIN is not a valid URI: {raw}"))?;

    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let bare = uri.authority().is_some()
        && !raw.ends_with('/')
        && uri
            .path_and_query()
            .map_or(true, |pq| pq.as_str().is_empty() || pq.as_str() == "/");

    if !scheme_ok || !bare {
        anyhow::bail!(
            "ERRLENS_ALLOWED_ORIGIN must have the form scheme://host[:port] (http or https), got {raw}"
        );
    }

    HeaderValue::from_str(raw).context("ERRLENS_ALLOWED_ORIGIN is not a valid header value")
}

/// 应用配置
///
/// 包含服务器运行所需的所有配置项
#[derive(Clone)]
pub struct Config {
    /// 监听地址
    pub listen: ListenAddr,
    /// Gemini API 密钥，以 `key` 查询参数发送
    pub google_api_key: String,
    /// 允许跨域访问的 Origin
    pub allowed_origin: HeaderValue,
    /// Gemini API 基础地址（测试时可指向 mock 服务）
    pub gemini_base_url: String,
    /// 调用的模型名称
    pub gemini_model: String,
    /// 是否禁用 TLS 验证（用于调试 mitmproxy 等场景）
    pub disable_tls_verify: bool,
}

// API 密钥不进入日志
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen", &self.listen)
            .field("google_api_key", &"<redacted>")
            .field("allowed_origin", &self.allowed_origin)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("disable_tls_verify", &self.disable_tls_verify)
            .finish()
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// # 环境变量
    ///
    /// - `GOOGLE_API_KEY`: Gemini API 密钥（**必需**）
    /// - `ERRLENS_HOST`: 服务器监听地址（默认: "0.0.0.0"）
    /// - `ERRLENS_PORT`: 服务器监听端口（默认: 8000）
    /// - `ERRLENS_ALLOWED_ORIGIN`: CORS Origin（默认: "http://localhost:3000"）
    /// - `ERRLENS_GEMINI_BASE_URL`: Gemini API 基础地址
    /// - `ERRLENS_GEMINI_MODEL`: 模型名称（默认: "gemini-2.5-flash"）
    /// - `ERRLENS_DISABLE_TLS_VERIFY`: "1" 或 "true" 时禁用 TLS 验证
    ///
    /// # 错误
    ///
    /// - 如果 `GOOGLE_API_KEY` 未设置或为空
    /// - 如果 `ERRLENS_PORT` 不是有效的端口号
    /// - 如果 `ERRLENS_ALLOWED_ORIGIN` 不是 `scheme://host[:port]` 形式
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 使用给定的查找函数加载配置，便于测试时不依赖进程环境
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("GOOGLE_API_KEY environment variable is required")?;

        let listen = ListenAddr::from_lookup(&lookup)?;

        let allowed_origin = parse_origin(
            &lookup("ERRLENS_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        )?;

        let gemini_base_url = lookup("ERRLENS_GEMINI_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

        let gemini_model =
            lookup("ERRLENS_GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let disable_tls_verify = lookup("ERRLENS_DISABLE_TLS_VERIFY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            listen,
            google_api_key,
            allowed_origin,
            gemini_base_url,
            gemini_model,
            disable_tls_verify,
        })
    }
}
