//! ロギング初期化
//!
//! 標準出力へのfmtレイヤーに加え、`OLLAMA_GATEWAY_LOG_DIR`が設定されていれば
//! 日次ローテーションのファイル出力を追加する。

use anyhow::Context;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベル（`EnvFilter`ディレクティブ）を指定する環境変数
pub const LOG_LEVEL_ENV: &str = "OLLAMA_GATEWAY_LOG_LEVEL";

/// ログファイルの出力先ディレクトリを指定する環境変数
pub const LOG_DIR_ENV: &str = "OLLAMA_GATEWAY_LOG_DIR";

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_PREFIX: &str = "ollama-gateway.log";

/// フィルタを構築する
///
/// 優先順位: `OLLAMA_GATEWAY_LOG_LEVEL` → `RUST_LOG` → `info`
pub fn build_filter() -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_LEVEL_ENV) {
        if let Ok(filter) = EnvFilter::try_new(&directives) {
            return filter;
        }
    }

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// ファイル出力先ディレクトリ
pub fn log_dir() -> Option<PathBuf> {
    std::env::var_os(LOG_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}

/// グローバルsubscriberを初期化する
///
/// ファイル出力が有効な場合は`WorkerGuard`を返す。プロセス終了まで保持すること。
pub fn init() -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter())
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .context("failed to initialize logging")?;

    Ok(guard)
}
