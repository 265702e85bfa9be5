//! Ollama Gateway Server
//!
//! ブラウザのチャットクライアントとローカルLLMデーモンを仲介するHTTPゲートウェイ

#![warn(missing_docs)]

use std::sync::Arc;

/// REST APIハンドラー
pub mod api;

/// バックエンドデーモンクライアント
pub mod backend;

/// CLIインターフェース
pub mod cli;

/// ロギング初期化ユーティリティ
pub mod logging;

/// アプリケーション状態
///
/// 起動時に一度だけ構築され、全ハンドラーへ明示的に渡される。
#[derive(Clone)]
pub struct AppState {
    /// バックエンドクライアント
    pub backend: Arc<dyn backend::BackendClient>,
}

impl AppState {
    /// 任意のバックエンド実装から状態を作成
    pub fn new(backend: impl backend::BackendClient + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}
