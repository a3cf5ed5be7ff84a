//! Model backend adapters / 模型后端适配器

pub mod ollama_chat;
pub mod openai_chat_completion;
pub mod stub;

pub use ollama_chat::OllamaChatBackend;
pub use openai_chat_completion::OpenAIChatCompletionBackend;
pub use stub::StubBackend;

use serde_json::Value;
use std::time::Duration;

use crate::orchestrator::invoker::{BackendError, CODE_INVALID_RESPONSE, CODE_UPSTREAM_ERROR};

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", base, p)
}

/// POST a JSON body and return the parsed JSON reply of a 2xx response
/// 发送JSON请求体并返回2xx响应解析后的JSON
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    body: &Value,
    timeout: Duration,
    extract_error: fn(&Value) -> Option<String>,
) -> Result<Value, BackendError> {
    let resp = request
        .header("content-type", "application/json")
        .json(body)
        .timeout(timeout)
        .send()
        .await?;
    let status = resp.status().as_u16();
    let bytes = resp.bytes().await?;

    let parsed = serde_json::from_slice::<Value>(&bytes);
    if !(200..300).contains(&status) {
        let extra = parsed.as_ref().ok().and_then(extract_error);
        return Err(BackendError::new(
            CODE_UPSTREAM_ERROR,
            match extra {
                Some(m) => format!("upstream status: {}: {}", status, m),
                None => format!("upstream status: {}", status),
            },
        ));
    }
    parsed.map_err(|e| BackendError::new(CODE_INVALID_RESPONSE, e.to_string()))
}
