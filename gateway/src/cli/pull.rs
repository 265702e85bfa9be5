//! pull サブコマンド
//!
//! モデルをダウンロードし、進捗を1行ずつ表示します。

use super::BackendArgs;
use crate::backend::OllamaClient;
use clap::Args;
use ollama_gateway_common::{config::GatewayConfig, protocol::PullStatus};

/// Arguments for the pull subcommand
#[derive(Args, Debug, Clone)]
pub struct PullArgs {
    /// Model name (e.g. llama3:8b)
    pub name: String,

    /// Backend connection overrides
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Execute the pull command
pub async fn execute(args: &PullArgs, mut config: GatewayConfig) -> anyhow::Result<()> {
    args.backend.apply(&mut config)?;
    let client = OllamaClient::new(config.backend)?;

    let result = client
        .pull_model_with(&args.name, |status| println!("{}", format_progress(status)))
        .await?;

    match result.final_status {
        Some(status) => println!("Pulled {}: {}", args.name, status.status),
        None => println!("Pulled {}: backend sent no status", args.name),
    }
    Ok(())
}

/// 進捗レコードを1行に整形
pub fn format_progress(status: &PullStatus) -> String {
    let mut line = status.status.clone();

    if let Some(digest) = &status.digest {
        line.push(' ');
        line.push_str(digest);
    }

    if let (Some(completed), Some(total)) = (status.completed, status.total) {
        if total > 0 {
            let percent = completed.saturating_mul(100) / total;
            line.push_str(&format!(" {}/{} bytes ({}%)", completed, total, percent));
        }
    }

    line
}
