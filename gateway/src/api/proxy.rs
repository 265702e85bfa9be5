//! バックエンドプロキシ APIハンドラー

use crate::{api::error::AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use ollama_gateway_common::protocol::{
    ActionOutput, GatewayGenerateRequest, GatewayResponse, PullRequest,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// POST /api/generate - 単発テキスト生成
pub async fn proxy_generate(
    State(state): State<AppState>,
    payload: Result<Json<GatewayGenerateRequest>, JsonRejection>,
) -> Result<Json<GatewayResponse>, AppError> {
    let span = info_span!("generate_request", request_id = %Uuid::new_v4());

    async move {
        let Json(request) = payload?;
        info!(model = %request.model, "Handling generate request");

        let text = state
            .backend
            .generate_text(&request.model, &request.prompt, &request.options)
            .await?;
        Ok::<_, AppError>(Json(GatewayResponse::from(ActionOutput::Text(text))))
    }
    .instrument(span)
    .await
}

/// POST /api/pull - モデルのダウンロード
///
/// ストリームを最後まで集約してから1つのレスポンスとして返す。
pub async fn proxy_pull(
    State(state): State<AppState>,
    payload: Result<Json<PullRequest>, JsonRejection>,
) -> Result<Json<GatewayResponse>, AppError> {
    let span = info_span!("pull_request", request_id = %Uuid::new_v4());

    async move {
        let Json(request) = payload?;
        info!(model = %request.name, "Handling pull request");

        let result = state.backend.pull_model(&request.name).await?;
        Ok::<_, AppError>(Json(GatewayResponse::from(ActionOutput::Pull(result))))
    }
    .instrument(span)
    .await
}
