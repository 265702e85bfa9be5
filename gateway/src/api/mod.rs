//! REST APIハンドラー
//!
//! チャット（アクションディスパッチ）、テキスト生成、モデルPull

/// チャット（アクションディスパッチ）
pub mod chat;
/// エラーレスポンス
pub mod error;
/// テキスト生成・Pullプロキシ
pub mod proxy;

use crate::AppState;
use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::handle_chat))
        .route("/api/generate", post(proxy::proxy_generate))
        .route("/api/pull", post(proxy::proxy_pull))
        .layer(TraceLayer::new_for_http())
        // ブラウザのチャットクライアントは別オリジンから呼び出す
        .layer(CorsLayer::permissive())
        .with_state(state)
}
