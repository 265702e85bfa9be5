use std::{sync::Arc, time::Duration};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde_json::{json, Value};

use super::http::{spawn_server, TestServer};

/// Ollamaモックサーバーを起動する
///
/// - GET /api/tags, GET /api/models（モデル一覧）
/// - POST /api/chat, POST /api/generate（非ストリーミング応答）
/// - POST /api/pull（`pull_chunks`をチャンクごとに遅延を挟んで送信）
#[allow(dead_code)]
pub async fn spawn_mock_ollama(pull_chunks: Vec<&'static str>) -> TestServer {
    async fn tags() -> impl IntoResponse {
        Json(json!({
            "models": [
                { "name": "llama3", "size": 4_661_224_676i64, "digest": "365c0bd3c000" }
            ]
        }))
    }

    async fn registry_models() -> impl IntoResponse {
        Json(json!({
            "models": [
                { "name": "llama3" },
                { "name": "mistral" }
            ]
        }))
    }

    async fn chat(Json(req): Json<Value>) -> impl IntoResponse {
        let last = req["messages"]
            .as_array()
            .and_then(|messages| messages.last())
            .and_then(|message| message["content"].as_str())
            .unwrap_or_default()
            .to_string();
        Json(json!({
            "model": req["model"],
            "message": { "role": "assistant", "content": format!("echo: {}", last) },
            "done": true
        }))
    }

    async fn generate(Json(req): Json<Value>) -> impl IntoResponse {
        Json(json!({
            "model": req["model"],
            "response": format!("generated: {}", req["prompt"].as_str().unwrap_or_default()),
            "done": true
        }))
    }

    async fn pull(State(chunks): State<Arc<Vec<&'static str>>>) -> Response {
        let chunks = chunks.as_ref().clone();
        let stream = futures::stream::iter(chunks).then(|chunk| async move {
            // チャンクが別々のTCP書き込みとして届くよう間隔を空ける
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, std::io::Error>(Bytes::from_static(chunk.as_bytes()))
        });

        (
            [(header::CONTENT_TYPE, "application/x-ndjson")],
            Body::from_stream(stream),
        )
            .into_response()
    }

    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/models", get(registry_models))
        .route("/api/chat", post(chat))
        .route("/api/generate", post(generate))
        .route("/api/pull", post(pull))
        .with_state(Arc::new(pull_chunks));

    spawn_server(app).await
}
