//! バックエンドデーモンクライアント
//!
//! デーモンのHTTP APIに対する5つの論理操作を定義する。
//! 本番実装は[`ollama::OllamaClient`]、テストでは任意の実装に差し替えられる。

/// reqwestによる本番実装
pub mod ollama;
/// Pullストリーム集約
pub mod pull;

use async_trait::async_trait;
use ollama_gateway_common::{
    error::{CommonError, GatewayResult},
    protocol::{AggregatedPullResult, ChatMessage, ModelDescriptor, RequestOptions},
};

pub use ollama::OllamaClient;

/// バックエンド操作のtrait
///
/// 各操作は1回のHTTP呼び出しに対応し、リトライは行わない。
/// 失敗はすべて呼び出し元へ伝播する。
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// ローカルで利用可能なモデル一覧（`GET /api/tags`）
    async fn list_models(&self) -> GatewayResult<Vec<ModelDescriptor>>;

    /// レジストリから取得可能なモデル一覧（`GET /api/models`）
    async fn list_available_models(&self) -> GatewayResult<Vec<ModelDescriptor>>;

    /// 単発のテキスト生成（`POST /api/generate`、非ストリーミング）
    async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        options: &RequestOptions,
    ) -> GatewayResult<String>;

    /// マルチターンのチャット補完（`POST /api/chat`、非ストリーミング）
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> GatewayResult<String>;

    /// モデルのダウンロード（`POST /api/pull`、ストリーミング集約）
    async fn pull_model(&self, name: &str) -> GatewayResult<AggregatedPullResult>;
}


/// 必須の文字列フィールドが空でないことを検証
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), CommonError> {
    if value.trim().is_empty() {
        return Err(CommonError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}
