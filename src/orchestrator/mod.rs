//! Orchestration pipeline / 编排流水线
//!
//! One inbound request runs through a fixed state machine:
//! 每个入站请求都经过固定的状态机：
//!
//! ```text
//! Start -> Prompting -> Invoking -> Validating -> Succeeded
//!   |          |            |            |
//!   +----------+------------+------------+------> Failed
//! ```
//!
//! The model is called at most once per request. Nothing is retried, cached or
//! stored between requests.
//! 每个请求最多调用一次模型，请求之间不重试、不缓存、不存储。

pub mod backends;
pub mod context;
pub mod error;
pub mod invoker;
pub mod prompt;
pub mod registry;
pub mod schema;
pub mod validator;


pub use context::{Method, RequestContext, Route, Shape};
pub use error::{ErrorKind, OrchestrationError};
pub use invoker::{BackendError, ModelBackend, ModelInvoker};
pub use prompt::{PromptBuilder, PromptConfig, PromptText};
pub use registry::{build_backend, BackendKind, ModelConfig};
pub use schema::CampaignResource;
pub use validator::{Payload, ResponseValidator};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace, warn, Instrument};
use uuid::Uuid;

/// Pipeline state / 流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    Start,
    Prompting,
    Invoking,
    Validating,
    Succeeded,
    Failed,
}

impl OrchestrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Allowed edges of the state machine / 状态机允许的转换
    pub fn can_transition_to(&self, next: OrchestrationState) -> bool {
        use OrchestrationState::*;
        matches!(
            (self, next),
            (Start, Prompting)
                | (Start, Failed)
                | (Prompting, Invoking)
                | (Prompting, Failed)
                | (Invoking, Validating)
                | (Invoking, Failed)
                | (Validating, Succeeded)
                | (Validating, Failed)
        )
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Prompting => "prompting",
            Self::Invoking => "invoking",
            Self::Validating => "validating",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of one request / 单个请求的最终结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrchestrationResult {
    Success { payload: Payload },
    Failure { kind: ErrorKind, detail: String },
}

impl OrchestrationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<OrchestrationError> for OrchestrationResult {
    fn from(e: OrchestrationError) -> Self {
        Self::Failure {
            kind: e.kind(),
            detail: e.detail(),
        }
    }
}

/// Result plus the path it took / 结果及其经过的路径
#[derive(Debug, Clone)]
pub struct Orchestration {
    pub request_id: String,
    pub result: OrchestrationResult,
    pub trace: Vec<OrchestrationState>,
}

impl Orchestration {
    pub fn visited(&self, state: OrchestrationState) -> bool {
        self.trace.contains(&state)
    }
}

struct StateMachine {
    state: OrchestrationState,
    trace: Vec<OrchestrationState>,
}

impl StateMachine {
    fn new() -> Self {
        Self {
            state: OrchestrationState::Start,
            trace: vec![OrchestrationState::Start],
        }
    }

    fn advance(&mut self, next: OrchestrationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.trace.push(next);
    }
}

/// Stateless request orchestrator / 无状态请求编排器
#[derive(Debug, Clone)]
pub struct Orchestrator {
    prompt_builder: PromptBuilder,
    invoker: ModelInvoker,
    validator: ResponseValidator,
}

impl Orchestrator {
    pub fn new(
        prompt_builder: PromptBuilder,
        invoker: ModelInvoker,
        validator: ResponseValidator,
    ) -> Self {
        Self {
            prompt_builder,
            invoker,
            validator,
        }
    }

    pub fn invoker(&self) -> &ModelInvoker {
        &self.invoker
    }

    /// Run one request to a terminal state / 将一个请求运行到终止状态
    pub async fn orchestrate(&self, ctx: &RequestContext) -> Orchestration {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "orchestrate",
            request_id = %request_id,
            method = %ctx.method,
            route = %ctx.path,
        );

        let mut machine = StateMachine::new();
        let outcome = self.run(ctx, &mut machine).instrument(span.clone()).await;

        let result = span.in_scope(|| match outcome {
            Ok(payload) => {
                machine.advance(OrchestrationState::Succeeded);
                info!(items = payload.len(), "orchestration succeeded");
                OrchestrationResult::Success { payload }
            }
            Err(e) => {
                machine.advance(OrchestrationState::Failed);
                warn!(kind = %e.kind(), detail = %e.detail(), "orchestration failed");
                OrchestrationResult::from(e)
            }
        });

        Orchestration {
            request_id,
            result,
            trace: machine.trace,
        }
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        machine: &mut StateMachine,
    ) -> Result<Payload, OrchestrationError> {
        let route = ctx.route()?;
        debug!(?ctx, "request context accepted");

        machine.advance(OrchestrationState::Prompting);
        let prompt = self.prompt_builder.build(&route);
        trace!(prompt = %prompt, "prompt built");

        machine.advance(OrchestrationState::Invoking);
        let raw = self.invoker.invoke(&prompt).await?;
        trace!(raw = %raw, "model replied");

        machine.advance(OrchestrationState::Validating);
        self.validator.validate(&raw, route.shape())
    }
}
