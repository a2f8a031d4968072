//! errlens - 运行时错误分析服务
//!
//! 接收前端上报的错误信息和堆栈，交给 Gemini 生成根因分析、修复建议
//! 和预防措施，并把结果原样返回。
//!
//! # 命令行接口
//!
//! - `serve`: 启动 API 服务器
//! - `test`: 向本地服务器发送一条示例错误

mod analysis;
mod commands;
mod config;
mod gateway;
mod gemini;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{Config, ListenAddr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// errlens CLI
#[derive(Parser)]
#[command(name = "errlens")]
#[command(about = "Runtime error analysis service backed by Gemini", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 可用的命令
#[derive(Subcommand)]
enum Commands {
    /// 启动 API 服务器
    Serve,
    /// 向本地服务器发送一条示例错误
    Test {
        /// 错误信息
        #[arg(short, long, default_value = "TypeError: Cannot read properties of undefined (reading 'map')")]
        message: String,
        /// 堆栈（省略时服务端使用占位文本）
        #[arg(short, long)]
        stack: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    if let Ok(dotenv_path) = std::env::var("ERRLENS_ENV_FILE") {
        dotenvy::from_path(&dotenv_path).ok();
    } else {
        dotenvy::dotenv().ok();
    }

    // 初始化日志系统
    let json_logs = std::env::var("ERRLENS_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "errlens=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        // 缺少 API 密钥时在监听端口之前退出
        Commands::Serve => commands::serve_command(Config::from_env()?).await,
        // 只访问本地服务，不需要 API 密钥
        Commands::Test { message, stack } => {
            commands::test_command(ListenAddr::from_env()?, message, stack).await
        }
    }
}
