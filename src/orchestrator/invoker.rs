//! Model invocation / 模型调用
//!
//! `ModelBackend` is the seam to an external generative model. `ModelInvoker`
//! wraps one backend with a hard time bound and makes exactly one call per
//! prompt; there is no retry.
//! `ModelBackend`是外部生成模型的接缝。`ModelInvoker`为后端加上硬性时间上限，每个提示只调用一次，不重试。

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::OrchestrationError;
use super::prompt::PromptText;

pub const CODE_TIMEOUT: &str = "timeout";
pub const CODE_NETWORK_ERROR: &str = "network_error";
pub const CODE_UPSTREAM_ERROR: &str = "upstream_error";
pub const CODE_INVALID_RESPONSE: &str = "invalid_response";
pub const CODE_INVALID_CONFIGURATION: &str = "invalid_configuration";

/// Error reported by a backend adapter / 后端适配器报告的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.code == CODE_TIMEOUT
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::new(CODE_TIMEOUT, e.to_string())
        } else {
            BackendError::new(CODE_NETWORK_ERROR, e.to_string())
        }
    }
}

/// A generative model endpoint / 生成模型端点
#[async_trait]
pub trait ModelBackend: Send + Sync {
    fn name(&self) -> &str;

    fn model_id(&self) -> &str;

    /// Send one prompt and return the model's raw text / 发送一个提示并返回模型原始文本
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, BackendError>;
}

#[derive(Clone)]
pub struct ModelInvoker {
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn model_id(&self) -> &str {
        self.backend.model_id()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Call the backend once within the configured bound
    /// 在配置的时间上限内调用后端一次
    pub async fn invoke(&self, prompt: &PromptText) -> Result<String, OrchestrationError> {
        let timeout_ms = self.timeout.as_millis() as u64;
        let call = self.backend.complete(prompt.as_str(), self.timeout);
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(OrchestrationError::Timeout { timeout_ms }),
            Ok(Err(e)) if e.is_timeout() => Err(OrchestrationError::Timeout { timeout_ms }),
            Ok(Err(e)) => Err(OrchestrationError::ModelUnavailable {
                message: format!("backend {} failed: {}", self.backend.name(), e),
            }),
            Ok(Ok(text)) => Ok(text),
        }
    }
}

impl fmt::Debug for ModelInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("backend", &self.backend.name())
            .field("model_id", &self.backend.model_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}
