//! 通信プロトコル定義
//!
//! Webクライアント↔Gateway間、Gateway↔バックエンドデーモン間の通信メッセージ

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// チャットメッセージのロール
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// ユーザー発話
    User,
    /// モデル応答
    Assistant,
    /// システムプロンプト
    System,
}

/// チャットメッセージ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// ロール
    pub role: ChatRole,
    /// 本文
    pub content: String,
}

impl ChatMessage {
    /// ユーザーロールのメッセージを作成
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// バックエンドが返すモデル情報
///
/// `name`以外のフィールド（size, digest, details等）はバックエンド定義のため
/// 解釈せずそのまま保持する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// モデル名
    pub name: String,
    /// バックエンド定義のメタデータ
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// `GET /api/tags` / `GET /api/models` のレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct ModelListResponse {
    /// モデル一覧
    pub models: Vec<ModelDescriptor>,
}

/// Sampling parameters forwarded under the backend's `options` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SamplingOptions {
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
    /// Context window size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// RNG seed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Repetition penalty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    /// Parameters not listed above, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request-level options merged into `/api/generate` and `/api/chat` bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestOptions {
    /// Response format (e.g. `"json"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    /// How long the backend keeps the model loaded (e.g. `"5m"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// System prompt override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Prompt template override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Bypass prompt templating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    /// Sampling parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SamplingOptions>,
    /// Unknown backend options, forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestOptions {
    /// リクエストボディの固定フィールド。`extra`からは常に除去される。
    pub const RESERVED_KEYS: [&'static str; 5] = ["model", "prompt", "messages", "stream", "name"];

    /// 予約キーを取り除いたコピーを返す
    ///
    /// `stream`を上書きしてストリーミング応答に切り替えたり、
    /// モデル名を差し替えたりできないようにする。
    pub fn sanitized(&self) -> Self {
        let mut options = self.clone();
        for key in Self::RESERVED_KEYS {
            options.extra.remove(key);
        }
        options
    }
}

/// `POST /api/generate` リクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    /// モデル名
    pub model: &'a str,
    /// プロンプト
    pub prompt: &'a str,
    /// 常に`false`
    pub stream: bool,
    /// 追加オプション
    #[serde(flatten)]
    pub options: RequestOptions,
}

/// `POST /api/generate` レスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// 生成テキスト
    pub response: String,
}

/// `POST /api/chat` リクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// モデル名
    pub model: &'a str,
    /// 会話履歴
    pub messages: &'a [ChatMessage],
    /// 常に`false`
    pub stream: bool,
    /// 追加オプション
    #[serde(flatten)]
    pub options: RequestOptions,
}

/// `POST /api/chat` レスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// アシスタントのメッセージ
    pub message: ChatResponseMessage,
}

/// `POST /api/chat` レスポンス内のメッセージ
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    /// 応答本文
    pub content: String,
}

/// `POST /api/pull` リクエストボディ
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// ダウンロードするモデル名
    #[serde(alias = "model")]
    pub name: String,
}

/// Pullストリームの1レコード（進捗）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullStatus {
    /// ステータス文字列（例: "pulling manifest", "success"）
    pub status: String,
    /// レイヤーのダイジェスト
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// 総バイト数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// 完了バイト数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<u64>,
}

/// Pullストリームの行としてデコードされ得る値
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PullRecord {
    /// バックエンドがストリーム内で報告した失敗
    Failure {
        /// エラーメッセージ
        error: String,
    },
    /// 進捗レコード
    Status(PullStatus),
}

/// Pull完了時の集約結果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregatedPullResult {
    /// 受信順に連結した生レコード（各行は改行で終端）
    pub raw: String,
    /// デコード済みレコード（受信順）
    pub records: Vec<PullStatus>,
    /// 最後に受信したレコード
    pub final_status: Option<PullStatus>,
}

/// `POST /api/chat`（Gateway）のアクション識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// チャット補完（識別子なし、または未知の識別子）
    Chat,
    /// ローカルモデル一覧
    ListModels,
    /// レジストリから取得可能なモデル一覧
    AvailableModels,
    /// モデル切替（対応するバックエンド操作なし）
    ChangeModel,
    /// 履歴クリア（対応するバックエンド操作なし）
    ClearHistory,
}

impl Action {
    /// 識別子文字列からアクションを決定する
    ///
    /// 識別子がない場合、または未知の値の場合は`Action::Chat`。
    pub fn from_discriminator(discriminator: Option<&str>) -> Self {
        match discriminator {
            Some("listModels") => Self::ListModels,
            Some("availableModels") => Self::AvailableModels,
            Some("changeModel") => Self::ChangeModel,
            Some("clearHistory") => Self::ClearHistory,
            _ => Self::Chat,
        }
    }

    /// 識別子文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ListModels => "listModels",
            Self::AvailableModels => "availableModels",
            Self::ChangeModel => "changeModel",
            Self::ClearHistory => "clearHistory",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Webクライアントからのチャットリクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayChatRequest {
    /// ユーザー入力
    #[serde(default)]
    pub message: String,
    /// アクション識別子
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// モデル名
    #[serde(default)]
    pub model: String,
    /// バックエンドへ渡す追加オプション
    #[serde(default)]
    pub options: RequestOptions,
}

impl GatewayChatRequest {
    /// リクエストのアクション
    pub fn action(&self) -> Action {
        Action::from_discriminator(self.action.as_deref())
    }
}

/// Webクライアントからのテキスト生成リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayGenerateRequest {
    /// モデル名
    #[serde(default)]
    pub model: String,
    /// プロンプト
    #[serde(default)]
    pub prompt: String,
    /// バックエンドへ渡す追加オプション
    #[serde(default)]
    pub options: RequestOptions,
}

/// 操作結果
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ActionOutput {
    /// テキスト応答
    Text(String),
    /// モデル一覧
    Models(Vec<ModelDescriptor>),
    /// Pull集約結果
    Pull(AggregatedPullResult),
}

/// 成功レスポンス `{ "response": ... }`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GatewayResponse {
    /// 操作結果
    pub response: ActionOutput,
}

impl From<ActionOutput> for GatewayResponse {
    fn from(response: ActionOutput) -> Self {
        Self { response }
    }
}
