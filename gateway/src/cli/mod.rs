//! CLI module for ollama-gateway
//!
//! Provides the server entry point plus a few one-shot commands against the backend daemon.

/// models サブコマンド
pub mod models;
/// pull サブコマンド
pub mod pull;
/// serve サブコマンド
pub mod serve;

use clap::{Args, Parser, Subcommand};
use ollama_gateway_common::{config::GatewayConfig, error::CommonResult};
use std::path::PathBuf;

/// Ollama gateway - HTTP bridge between a browser chat client and a local LLM daemon
#[derive(Parser, Debug)]
#[command(name = "ollama-gateway")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    OLLAMA_GATEWAY_CONFIG                Configuration file (TOML/JSON)
    OLLAMA_GATEWAY_HOST                  Bind address (default: 127.0.0.1)
    OLLAMA_GATEWAY_PORT                  Listen port (default: 3000)
    OLLAMA_GATEWAY_BACKEND__BASE_URL     Backend daemon URL (default: http://localhost:11434)
    OLLAMA_GATEWAY_BACKEND__TIMEOUT_MS   Backend request timeout (default: 50000)
    OLLAMA_GATEWAY_LOG_LEVEL             Log level (default: info)
    OLLAMA_GATEWAY_LOG_DIR               Write daily-rotated log files to this directory
"#)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "OLLAMA_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// 設定ファイルと環境変数から設定を読み込む
    pub fn load_config(&self) -> CommonResult<GatewayConfig> {
        GatewayConfig::load(self.config.as_deref())
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the gateway server (default)
    Serve(serve::ServeArgs),
    /// List models known to the backend daemon
    Models(models::ModelsArgs),
    /// Download a model through the backend daemon
    Pull(pull::PullArgs),
}

/// バックエンド接続のCLI上書き
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Backend daemon base URL
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Backend request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl BackendArgs {
    /// 指定されたフラグだけを設定へ反映する
    pub fn apply(&self, config: &mut GatewayConfig) -> CommonResult<()> {
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.backend.timeout_ms = timeout_ms;
        }
        config.validate()
    }
}
