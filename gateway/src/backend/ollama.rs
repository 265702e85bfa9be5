//! Ollama互換デーモンクライアント（reqwest）

use super::{
    pull::{self, StreamAggregator},
    require_non_empty, BackendClient,
};
use async_trait::async_trait;
use ollama_gateway_common::{
    config::BackendConfig,
    error::{CommonError, GatewayError, GatewayResult},
    protocol::{
        AggregatedPullResult, ChatMessage, ChatRequest, ChatResponse, GenerateRequest,
        GenerateResponse, ModelDescriptor, ModelListResponse, PullRequest, PullStatus,
        RequestOptions,
    },
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

/// Ollama互換デーモンのHTTPクライアント
///
/// プロセス起動時に1つだけ生成し、`AppState`経由で共有する。
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: Client,
    config: BackendConfig,
}

impl OllamaClient {
    /// 新しいOllamaClientを作成
    ///
    /// タイムアウトはクライアント単位で固定され、ストリーミングボディの受信を含む
    /// 呼び出し全体に適用される。
    pub fn new(config: BackendConfig) -> GatewayResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CommonError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// 接続設定
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// リクエストを送信し、2xx以外をエラーに変換する
    async fn send(&self, request: RequestBuilder, operation: &str) -> GatewayResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Error {}: {}", operation, e);
            GatewayError::BackendUnreachable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Error {}: backend returned HTTP {}", operation, status);
            return Err(GatewayError::BackendHttpError {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    /// レスポンスボディ全体を受信してJSONとしてデコードする
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        operation: &str,
    ) -> GatewayResult<T> {
        let body = response.bytes().await.map_err(|e| {
            warn!("Error {}: failed to read response body: {}", operation, e);
            GatewayError::BackendUnreachable(e.to_string())
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!("Error {}: unexpected response body: {}", operation, e);
            GatewayError::InvalidResponse(format!("Failed to parse {} response: {}", operation, e))
        })
    }

    async fn fetch_models(&self, path: &str, operation: &str) -> GatewayResult<Vec<ModelDescriptor>> {
        let url = self.url(path);
        debug!("Fetching models: {}", url);

        let response = self.send(self.http_client.get(&url), operation).await?;
        let list: ModelListResponse = Self::read_json(response, operation).await?;
        Ok(list.models)
    }

    /// モデルをダウンロードし、各進捗レコードを`on_progress`へ渡す
    pub async fn pull_model_with<F>(
        &self,
        name: &str,
        on_progress: F,
    ) -> GatewayResult<AggregatedPullResult>
    where
        F: FnMut(&PullStatus) + Send,
    {
        require_non_empty("model name", name)?;

        let mut aggregator = StreamAggregator::new();
        aggregator.begin_request();

        let request = self.http_client.post(self.url("/api/pull")).json(&PullRequest {
            name: name.to_string(),
        });
        let response = match self.send(request, "pulling model").await {
            Ok(response) => response,
            Err(e) => return Err(aggregator.fail(e)),
        };

        let result = pull::aggregate(aggregator, Box::pin(response.bytes_stream()), on_progress)
            .await
            .map_err(|e| {
                warn!("Error pulling model {}: {}", name, e);
                e
            })?;

        info!(
            model = %name,
            records = result.records.len(),
            "Model pull completed"
        );
        Ok(result)
    }
}

#[async_trait]
impl BackendClient for OllamaClient {
    async fn list_models(&self) -> GatewayResult<Vec<ModelDescriptor>> {
        self.fetch_models("/api/tags", "listing models").await
    }

    async fn list_available_models(&self) -> GatewayResult<Vec<ModelDescriptor>> {
        self.fetch_models("/api/models", "listing available models")
            .await
    }

    async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        options: &RequestOptions,
    ) -> GatewayResult<String> {
        require_non_empty("model", model)?;
        require_non_empty("prompt", prompt)?;

        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
            options: options.sanitized(),
        };
        let request = self.http_client.post(self.url("/api/generate")).json(&body);
        let response = self.send(request, "generating text").await?;
        let generated: GenerateResponse = Self::read_json(response, "generating text").await?;

        Ok(generated.response)
    }

    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> GatewayResult<String> {
        require_non_empty("model", model)?;
        if messages.is_empty() {
            return Err(CommonError::Validation("messages must not be empty".to_string()).into());
        }

        let body = ChatRequest {
            model,
            messages,
            stream: false,
            options: options.sanitized(),
        };
        let request = self.http_client.post(self.url("/api/chat")).json(&body);
        let response = self.send(request, "in chat completion").await?;
        let chat: ChatResponse = Self::read_json(response, "chat completion").await?;

        Ok(chat.message.content)
    }

    async fn pull_model(&self, name: &str) -> GatewayResult<AggregatedPullResult> {
        self.pull_model_with(name, |status| {
            info!("Pulling {}: {}", name, status.status);
        })
        .await
    }
}
