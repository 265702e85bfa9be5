//! 設定管理
//!
//! GatewayConfig, BackendConfig等の設定構造体

use crate::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 環境変数のプレフィックス（例: `OLLAMA_GATEWAY_PORT`, `OLLAMA_GATEWAY_BACKEND__BASE_URL`）
pub const ENV_PREFIX: &str = "OLLAMA_GATEWAY";

/// Gateway設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayConfig {
    /// ホストアドレス (デフォルト: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// バックエンドデーモン接続設定
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend: BackendConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// 設定ファイル（任意）と環境変数から設定を読み込む
    ///
    /// 優先順位: 環境変数 > 設定ファイル > デフォルト値
    pub fn load(path: Option<&Path>) -> CommonResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// バインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 設定値を検証
    pub fn validate(&self) -> CommonResult<()> {
        self.backend.validate()
    }
}

/// バックエンドデーモン接続設定
///
/// クライアント生成後は変更されず、全リクエストで読み取り専用として共有される。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// ベースURL (デフォルト: "http://localhost:11434")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// リクエストタイムアウト（ミリ秒）(デフォルト: 50000)
    ///
    /// ストリーミングボディの受信を含む呼び出し全体に適用される。
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_ms() -> u64 {
    50_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl BackendConfig {
    /// 指定URLの設定を作成（タイムアウトはデフォルト）
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// タイムアウト
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 末尾スラッシュを除いたベースURL
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// 設定値を検証
    pub fn validate(&self) -> CommonResult<()> {
        if self.base_url().is_empty() {
            return Err(CommonError::Config(
                "backend base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(CommonError::Config(
                "backend timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
