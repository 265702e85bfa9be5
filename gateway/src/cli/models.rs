//! models サブコマンド
//!
//! バックエンドデーモンのモデル一覧を表示します。

use super::BackendArgs;
use crate::backend::{BackendClient, OllamaClient};
use clap::Args;
use ollama_gateway_common::{config::GatewayConfig, error::GatewayResult, protocol::ModelDescriptor};

/// Arguments for the models subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ModelsArgs {
    /// List models available from the registry instead of installed ones
    #[arg(long)]
    pub available: bool,

    /// Backend connection overrides
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Execute the models command
pub async fn execute(args: &ModelsArgs, mut config: GatewayConfig) -> anyhow::Result<()> {
    args.backend.apply(&mut config)?;
    let client = OllamaClient::new(config.backend)?;

    let models = fetch(&client, args.available).await?;
    print!("{}", format_models(&models));
    Ok(())
}

/// モデル一覧を取得
pub async fn fetch(
    backend: &dyn BackendClient,
    available: bool,
) -> GatewayResult<Vec<ModelDescriptor>> {
    if available {
        backend.list_available_models().await
    } else {
        backend.list_models().await
    }
}

/// 表形式に整形
pub fn format_models(models: &[ModelDescriptor]) -> String {
    if models.is_empty() {
        return "No models found\n".to_string();
    }

    let mut output = String::from("NAME\tSIZE\n");
    for model in models {
        let size = model
            .metadata
            .get("size")
            .and_then(|v| v.as_u64())
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!("{}\t{}\n", model.name, size));
    }
    output
}

fn format_size(bytes: u64) -> String {
    const GB: f64 = 1_000_000_000.0;
    const MB: f64 = 1_000_000.0;

    let bytes = bytes as f64;
    if bytes >= GB {
        format!("{:.1} GB", bytes / GB)
    } else {
        format!("{:.0} MB", bytes / MB)
    }
}
