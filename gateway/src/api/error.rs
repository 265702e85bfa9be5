//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ollama_gateway_common::error::{CommonError, GatewayError};
use serde_json::json;
use tracing::error;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub GatewayError);

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError(err)
    }
}

impl From<CommonError> for AppError {
    fn from(err: CommonError) -> Self {
        AppError(GatewayError::Common(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(GatewayError::Common(CommonError::Validation(format!(
            "Malformed request body: {}",
            rejection.body_text()
        ))))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 詳細はログのみに出力し、クライアントには汎用メッセージを返す
        error!(kind = self.0.kind(), error = %self.0, "Request failed");

        let payload = json!({
            "error": self.0.external_message()
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
    }
}
