use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use super::{join_url, post_json};
use crate::orchestrator::invoker::{
    BackendError, ModelBackend, CODE_INVALID_CONFIGURATION, CODE_INVALID_RESPONSE,
};

pub struct OpenAIChatCompletionBackend {
    name: String,
    base_url: String,
    api_key: String,
    model_id: String,
    temperature: Option<f64>,
    client: reqwest::Client,
}

impl OpenAIChatCompletionBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            temperature: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    fn url(&self) -> String {
        if self.base_url.contains("/v1") {
            join_url(&self.base_url, "chat/completions")
        } else {
            join_url(&self.base_url, "v1/chat/completions")
        }
    }

    fn build_body(&self, prompt: &str) -> Value {
        let mut body = json!({
            "model": self.model_id,
            "messages": [
                { "role": "user", "content": prompt }
            ],
        });
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }
        body
    }

    fn extract_openai_error_message(json: &Value) -> Option<String> {
        let e = json.get("error")?;
        let msg = e.get("message").and_then(|v| v.as_str()).unwrap_or("");
        let ty = e.get("type").and_then(|v| v.as_str()).unwrap_or("");
        let code_owned = if let Some(s) = e.get("code").and_then(|v| v.as_str()) {
            s.to_string()
        } else if let Some(n) = e.get("code").and_then(|v| v.as_i64()) {
            n.to_string()
        } else {
            String::new()
        };

        let parts: Vec<&str> = [ty, code_owned.as_str(), msg]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(": "))
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAIChatCompletionBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, BackendError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(BackendError::new(
                CODE_INVALID_CONFIGURATION,
                "missing api key",
            ));
        }

        let request = self
            .client
            .post(self.url())
            .header("authorization", format!("Bearer {}", api_key));
        let parsed = post_json(
            request,
            &self.build_body(prompt),
            timeout,
            Self::extract_openai_error_message,
        )
        .await?;

        parsed
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                BackendError::new(
                    CODE_INVALID_RESPONSE,
                    "missing choices[0].message.content",
                )
            })
    }
}
