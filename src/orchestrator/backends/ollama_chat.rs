use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{join_url, post_json};
use crate::orchestrator::invoker::{
    BackendError, ModelBackend, CODE_INVALID_CONFIGURATION, CODE_INVALID_RESPONSE,
};

pub struct OllamaChatBackend {
    name: String,
    base_url: String,
    model_id: String,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl OllamaChatBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            model_id: model_id.into(),
            temperature: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_chat_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model_id,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream": false,
        });
        if let Some(t) = self.temperature {
            body["options"] = json!({ "temperature": t });
        }
        body
    }

    fn extract_error_message(v: &Value) -> Option<String> {
        v.get("error")
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
    }
}

#[async_trait]
impl ModelBackend for OllamaChatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, BackendError> {
        if self.model_id.trim().is_empty() {
            return Err(BackendError::new(CODE_INVALID_CONFIGURATION, "missing model"));
        }

        let request = self.client.post(join_url(&self.base_url, "api/chat"));
        let parsed = post_json(
            request,
            &self.build_chat_body(prompt),
            timeout,
            Self::extract_error_message,
        )
        .await?;

        parsed
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| BackendError::new(CODE_INVALID_RESPONSE, "missing message.content"))
    }
}
