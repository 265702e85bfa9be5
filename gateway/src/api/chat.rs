//! チャットAPIハンドラー
//!
//! `POST /api/chat` はアクション識別子に応じて1つのバックエンド操作へ振り分ける。

use crate::{api::error::AppError, backend::BackendClient, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use ollama_gateway_common::{
    error::{GatewayError, GatewayResult},
    protocol::{Action, ActionOutput, ChatMessage, GatewayChatRequest, GatewayResponse},
};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// POST /api/chat - アクションディスパッチ
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<GatewayChatRequest>, JsonRejection>,
) -> Result<Json<GatewayResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat_request", %request_id);

    async move {
        let Json(request) = payload?;
        info!(action = %request.action(), model = %request.model, "Handling chat request");

        let output = dispatch(state.backend.as_ref(), request).await?;
        Ok::<_, AppError>(Json(GatewayResponse::from(output)))
    }
    .instrument(span)
    .await
}

/// リクエストのアクションに対応するバックエンド操作を1回だけ呼び出す
pub async fn dispatch(
    backend: &dyn BackendClient,
    request: GatewayChatRequest,
) -> GatewayResult<ActionOutput> {
    let action = request.action();
    debug!(%action, "Dispatching action");

    match action {
        Action::Chat => {
            let messages = [ChatMessage::user(request.message)];
            backend
                .chat_completion(&request.model, &messages, &request.options)
                .await
                .map(ActionOutput::Text)
        }
        Action::ListModels => backend.list_models().await.map(ActionOutput::Models),
        Action::AvailableModels => backend
            .list_available_models()
            .await
            .map(ActionOutput::Models),
        Action::ChangeModel | Action::ClearHistory => Err(GatewayError::UnsupportedAction(action)),
    }
}
