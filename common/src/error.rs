//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! バックエンドへの呼び出しで発生したエラーはすべて`GatewayError`として
//! 呼び出し元へ伝播し、APIレイヤーで一括して汎用エラーレスポンスに変換される。

use crate::protocol::Action;
use thiserror::Error;

/// 外部クライアントへ返す唯一のエラーメッセージ
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred processing your request";

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for CommonError {
    fn from(err: config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Connection refused, timeout or a transport failure while reading the body
    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    /// The backend replied with a non-2xx status
    #[error("Backend returned HTTP {status}")]
    BackendHttpError {
        /// HTTP status code received from the backend
        status: u16,
    },

    /// A pull stream line could not be decoded as a status record
    #[error("Malformed pull stream record: {0}")]
    StreamParseError(String),

    /// The backend reported a failure record inside the pull stream
    #[error("Pull rejected by backend: {0}")]
    PullRejected(String),

    /// A 2xx response body did not have the expected shape
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// The action discriminator has no backend operation
    #[error("Unsupported action: {0}")]
    UnsupportedAction(Action),
}

impl GatewayError {
    /// Returns a safe error message for external clients.
    ///
    /// Every failure maps to the same generic message. Backend status codes,
    /// URLs and parse details stay in the server logs (`Display`).
    pub fn external_message(&self) -> &'static str {
        GENERIC_ERROR_MESSAGE
    }

    /// ログ出力用の短いエラー種別
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "validation",
            Self::Common(_) => "common",
            Self::BackendUnreachable(_) => "backend_unreachable",
            Self::BackendHttpError { .. } => "backend_http_error",
            Self::StreamParseError(_) => "stream_parse_error",
            Self::PullRejected(_) => "pull_rejected",
            Self::InvalidResponse(_) => "invalid_response",
            Self::UnsupportedAction(_) => "unsupported_action",
        }
    }
}

/// Result type alias (Common)
pub type CommonResult<T> = Result<T, CommonError>;

/// Result type alias (gateway)
pub type GatewayResult<T> = Result<T, GatewayError>;
