use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use ollama_gateway::{api, backend::OllamaClient, AppState};
use ollama_gateway_common::config::BackendConfig;
use serde_json::Value;
use tower::ServiceExt;

/// 指定したバックエンドURLへ接続するゲートウェイのルーターを作成する
#[allow(dead_code)]
pub fn build_gateway(backend_url: impl Into<String>) -> Router {
    let client = OllamaClient::new(BackendConfig::with_base_url(backend_url)).unwrap();
    api::create_router(AppState::new(client))
}

/// JSONボディでPOSTし、ステータスとJSONレスポンスを返す
#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

/// 任意の文字列ボディでPOSTする
#[allow(dead_code)]
pub async fn post_raw(app: Router, uri: &str, body: impl Into<String>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.into()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
