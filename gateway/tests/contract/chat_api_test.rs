//! Contract Test: POST /api/chat
//!
//! アクションディスパッチとエラー応答の契約テスト

use crate::support::{
    gateway::{build_gateway, post_json, post_raw},
    http::closed_port_url,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use ollama_gateway_common::error::GENERIC_ERROR_MESSAGE;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn generic_error() -> serde_json::Value {
    json!({"error": GENERIC_ERROR_MESSAGE})
}

#[tokio::test]
async fn chat_without_action_returns_assistant_text() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "messages": [{"role": "user", "content": "hello"}],
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": "hi there"},
            "done": true
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_gateway(backend.uri());
    let (status, body) = post_json(
        app,
        "/api/chat",
        &json!({"message": "hello", "model": "llama3"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "hi there"}));
}

#[tokio::test]
async fn chat_forwards_options_without_reserved_keys() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "stream": false,
            "keep_alive": "10m",
            "options": {"temperature": 0.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "ok"}
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_gateway(backend.uri());
    let (status, body) = post_json(
        app,
        "/api/chat",
        &json!({
            "message": "hello",
            "model": "llama3",
            "options": {
                "keep_alive": "10m",
                "options": {"temperature": 0.0},
                "stream": true,
                "model": "other"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "ok"}));
}

#[tokio::test]
async fn list_models_action_returns_descriptors() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"models": [{"name": "llama3"}]})),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_gateway(backend.uri());
    let (status, body) = post_json(app, "/api/chat", &json!({"action": "listModels"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": [{"name": "llama3"}]}));
}

#[tokio::test]
async fn available_models_action_uses_registry_listing() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama3", "description": "Meta Llama 3"}, {"name": "phi3"}]
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let app = build_gateway(backend.uri());
    let (status, body) =
        post_json(app, "/api/chat", &json!({"action": "availableModels"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"response": [
            {"name": "llama3", "description": "Meta Llama 3"},
            {"name": "phi3"}
        ]})
    );
}

#[tokio::test]
async fn unsupported_actions_fail_without_backend_call() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    for action in ["changeModel", "clearHistory"] {
        let app = build_gateway(backend.uri());
        let (status, body) = post_json(
            app,
            "/api/chat",
            &json!({"action": action, "model": "mistral", "message": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, generic_error());
    }
}

#[tokio::test]
async fn unreachable_backend_returns_generic_error() {
    let app = build_gateway(closed_port_url());

    let (status, body) = post_json(
        app,
        "/api/chat",
        &json!({"message": "hello", "model": "llama3"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic_error());
}

#[tokio::test]
async fn backend_http_errors_are_not_leaked() {
    for backend_status in [404u16, 500] {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(backend_status).set_body_string("model 'x' not found"),
            )
            .mount(&backend)
            .await;

        let app = build_gateway(backend.uri());
        let (status, body) = post_json(app, "/api/chat", &json!({"action": "listModels"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, generic_error());
    }
}

#[tokio::test]
async fn malformed_request_body_returns_generic_error() {
    let backend = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let app = build_gateway(backend.uri());
    let (status, body) = post_raw(app, "/api/chat", "{\"message\": ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic_error());
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let backend = MockServer::start().await;
    let app = build_gateway(backend.uri());

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/chat")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
