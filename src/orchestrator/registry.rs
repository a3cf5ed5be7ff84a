//! Backend construction from configuration / 根据配置构建后端

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::backends::{OllamaChatBackend, OpenAIChatCompletionBackend, StubBackend};
use super::invoker::ModelBackend;

/// Supported backend kinds / 支持的后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Stub,
    OpenaiChatCompletion,
    OllamaChat,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Stub => "stub",
            BackendKind::OpenaiChatCompletion => "openai_chat_completion",
            BackendKind::OllamaChat => "ollama_chat",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, BackendKind::OpenaiChatCompletion)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "stub" => Ok(BackendKind::Stub),
            "openai_chat_completion" => Ok(BackendKind::OpenaiChatCompletion),
            "ollama_chat" => Ok(BackendKind::OllamaChat),
            other => bail!("unknown backend kind: {}", other),
        }
    }
}

/// Model backend configuration / 模型后端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Backend kind / 后端类型
    pub backend: BackendKind,
    /// Instance name used in logs / 日志中使用的实例名称
    pub name: String,
    /// Model identifier sent to the provider / 发送给提供方的模型标识
    pub model_id: String,
    /// Provider base URL / 提供方基础URL
    pub base_url: String,
    /// Environment variable holding the API key / 保存API密钥的环境变量
    pub api_key_env: Option<String>,
    /// Per-call timeout in milliseconds / 单次调用超时（毫秒）
    pub timeout_ms: u64,
    /// Sampling temperature / 采样温度
    pub temperature: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Stub,
            name: "stub".to_string(),
            model_id: String::new(),
            base_url: String::new(),
            api_key_env: None,
            timeout_ms: 30_000,
            temperature: None,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the env var to read the key from / 读取密钥的环境变量名
    pub fn api_key_env_name(&self) -> &str {
        self.api_key_env
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("OPENAI_API_KEY")
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            bail!("model.timeout_ms must be greater than 0");
        }
        if self.backend != BackendKind::Stub {
            if self.model_id.trim().is_empty() {
                bail!("model.model_id is required for backend {}", self.backend);
            }
            if self.base_url.trim().is_empty() {
                bail!("model.base_url is required for backend {}", self.backend);
            }
        }
        if self.backend.requires_api_key() {
            let env_name = self.api_key_env_name();
            let present = std::env::var(env_name)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            if !present {
                bail!(
                    "backend {} requires env var {} to hold an API key",
                    self.backend,
                    env_name
                );
            }
        }
        Ok(())
    }
}

/// Build the configured backend / 构建配置的后端
pub fn build_backend(cfg: &ModelConfig) -> Result<Arc<dyn ModelBackend>> {
    let name = if cfg.name.trim().is_empty() {
        cfg.backend.as_str().to_string()
    } else {
        cfg.name.clone()
    };

    let backend: Arc<dyn ModelBackend> = match cfg.backend {
        BackendKind::Stub => Arc::new(StubBackend::new(name)),
        BackendKind::OpenaiChatCompletion => {
            let env_name = cfg.api_key_env_name();
            let api_key = std::env::var(env_name).unwrap_or_default();
            if api_key.trim().is_empty() {
                bail!("missing required env var {} for backend {}", env_name, name);
            }
            Arc::new(
                OpenAIChatCompletionBackend::new(
                    name,
                    cfg.base_url.clone(),
                    api_key,
                    cfg.model_id.clone(),
                )
                .with_temperature(cfg.temperature),
            )
        }
        BackendKind::OllamaChat => Arc::new(
            OllamaChatBackend::new(name, cfg.base_url.clone(), cfg.model_id.clone())
                .with_temperature(cfg.temperature),
        ),
    };

    tracing::info!(
        backend = %cfg.backend,
        name = %backend.name(),
        model = %backend.model_id(),
        timeout_ms = cfg.timeout_ms,
        "model backend ready"
    );
    Ok(backend)
}
