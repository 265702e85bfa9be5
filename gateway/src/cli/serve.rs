//! serve サブコマンド
//!
//! ゲートウェイサーバーを起動します。

use super::BackendArgs;
use crate::{api, backend::OllamaClient, AppState};
use anyhow::Context;
use clap::Args;
use ollama_gateway_common::{config::GatewayConfig, error::CommonResult};
use tracing::{error, info};

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Backend connection overrides
    #[command(flatten)]
    pub backend: BackendArgs,
}

impl ServeArgs {
    /// 指定されたフラグだけを設定へ反映する
    pub fn apply(&self, config: &mut GatewayConfig) -> CommonResult<()> {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        self.backend.apply(config)
    }
}

/// サーバーを起動し、シャットダウンシグナルまで待機する
pub async fn execute(args: &ServeArgs, mut config: GatewayConfig) -> anyhow::Result<()> {
    args.apply(&mut config)?;

    info!("Ollama Gateway v{}", env!("CARGO_PKG_VERSION"));

    let client = OllamaClient::new(config.backend.clone())?;
    let app = api::create_router(AppState::new(client));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!(
        backend = %config.backend.base_url(),
        timeout_ms = config.backend.timeout_ms,
        "Ollama Gateway listening on {}",
        bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
