//! Shared helpers for integration tests
//! 集成测试共享工具

#![allow(dead_code)]

use async_trait::async_trait;
use generative_api::gateway::{create_gateway_router, GatewayState};
use generative_api::orchestrator::invoker::{BackendError, ModelBackend};
use generative_api::orchestrator::{
    ModelInvoker, Orchestrator, PromptBuilder, PromptConfig, ResponseValidator,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CAMPAIGN: &str = r#"{"uuid":"3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b","name":"Spring Sale","startDate":"2024-03-01","endDate":"2024-03-31","isActive":true}"#;

/// Backend replaying a queue of replies / 按队列回放回复的后端
pub struct ScriptedBackend {
    replies: Mutex<Vec<Result<String, BackendError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn always(reply: &str) -> Arc<Self> {
        Self::new(vec![Ok(reply.to_string()); 16])
    }

    /// Backend that sleeps before replying / 回复前休眠的后端
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(vec![Ok(CAMPAIGN.to_string())]),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self.replies.lock().unwrap().pop();
        next.unwrap_or_else(|| Ok("[]".to_string()))
    }
}

pub fn orchestrator(backend: Arc<dyn ModelBackend>, timeout: Duration) -> Orchestrator {
    Orchestrator::new(
        PromptBuilder::new(PromptConfig::default()),
        ModelInvoker::new(backend, timeout),
        ResponseValidator::new(),
    )
}

/// Serve the gateway on an ephemeral port / 在临时端口上运行网关
pub async fn spawn_gateway(
    backend: Arc<dyn ModelBackend>,
    timeout: Duration,
) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let state = GatewayState::new(orchestrator(backend, timeout));
    let app = create_gateway_router(state, true, timeout + Duration::from_secs(5));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}
