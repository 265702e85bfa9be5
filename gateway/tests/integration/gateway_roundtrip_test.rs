//! Integration Test: ブラウザクライアント → ゲートウェイ → デーモン

use crate::support::{
    http::{closed_port_url, spawn_server, TestServer},
    ollama::spawn_mock_ollama,
};
use ollama_gateway::{api, backend::OllamaClient, AppState};
use ollama_gateway_common::{config::BackendConfig, error::GENERIC_ERROR_MESSAGE};
use serde_json::{json, Value};

async fn spawn_gateway(backend_url: String) -> TestServer {
    let client = OllamaClient::new(BackendConfig::with_base_url(backend_url)).unwrap();
    spawn_server(api::create_router(AppState::new(client))).await
}

async fn post(gateway: &TestServer, uri: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}{}", gateway.base_url(), uri))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn chat_and_model_listing_roundtrip() {
    let daemon = spawn_mock_ollama(Vec::new()).await;
    let gateway = spawn_gateway(daemon.base_url()).await;

    let (status, body) = post(
        &gateway,
        "/api/chat",
        json!({"message": "hello", "model": "llama3"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"response": "echo: hello"}));

    let (status, body) = post(&gateway, "/api/chat", json!({"action": "listModels"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["response"][0]["name"], "llama3");
    assert_eq!(body["response"][0]["digest"], "365c0bd3c000");

    let (status, body) = post(
        &gateway,
        "/api/chat",
        json!({"action": "availableModels"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["response"].as_array().unwrap().len(), 2);

    let (status, body) = post(
        &gateway,
        "/api/generate",
        json!({"model": "llama3", "prompt": "count to three"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"response": "generated: count to three"}));

    gateway.stop().await;
    daemon.stop().await;
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let daemon = spawn_mock_ollama(Vec::new()).await;
    let gateway = spawn_gateway(daemon.base_url()).await;

    let requests = (0..8).map(|i| {
        post(
            &gateway,
            "/api/chat",
            json!({"message": format!("message {}", i), "model": "llama3"}),
        )
    });
    let responses = futures::future::join_all(requests).await;

    for (i, (status, body)) in responses.into_iter().enumerate() {
        assert_eq!(status, 200);
        assert_eq!(body["response"], format!("echo: message {}", i));
    }

    gateway.stop().await;
    daemon.stop().await;
}

#[tokio::test]
async fn daemon_down_yields_generic_error() {
    let gateway = spawn_gateway(closed_port_url()).await;

    let (status, body) = post(
        &gateway,
        "/api/chat",
        json!({"message": "hello", "model": "llama3"}),
    )
    .await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": GENERIC_ERROR_MESSAGE}));

    gateway.stop().await;
}
