//! Serve 命令 - 启动 API 服务器

use anyhow::Result;

use crate::config::Config;
use crate::gateway;

/// 执行服务器启动命令
///
/// # 参数
///
/// * `config` - 已校验的应用配置（API 密钥在此之前已确认存在）
///
/// # 功能
///
/// - 创建 Gemini 客户端
/// - 初始化 HTTP 路由、CORS 和日志中间件
/// - 启动服务器并等待关闭信号（Ctrl+C 或 SIGTERM）
pub async fn serve_command(config: Config) -> Result<()> {
    gateway::serve(config).await
}
