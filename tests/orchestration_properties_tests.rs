//! Behavioral properties of the orchestration pipeline
//! 编排流水线的行为属性

mod common;

use common::{orchestrator, ScriptedBackend, CAMPAIGN};
use generative_api::orchestrator::invoker::{BackendError, CODE_NETWORK_ERROR, CODE_TIMEOUT};
use generative_api::orchestrator::{
    ErrorKind, OrchestrationResult, OrchestrationState, Payload, RequestContext,
};
use std::time::Duration;

const ID: &str = "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b";

#[tokio::test]
async fn test_each_request_calls_model_exactly_once() {
    // No retry on any failure kind / 任何失败类型都不重试
    let backend = ScriptedBackend::new(vec![
        Err(BackendError::new(CODE_NETWORK_ERROR, "reset")),
        Ok("garbage".to_string()),
        Ok(CAMPAIGN.to_string()),
        Ok(r#"{"uuid":"bad"}"#.to_string()),
    ]);
    let orch = orchestrator(backend.clone(), Duration::from_secs(1));

    let kinds = [
        orch.orchestrate(&RequestContext::get_campaign(ID)).await.result.kind(),
        orch.orchestrate(&RequestContext::get_campaign(ID)).await.result.kind(),
        orch.orchestrate(&RequestContext::list_campaigns()).await.result.kind(),
        orch.orchestrate(&RequestContext::get_campaign(ID)).await.result.kind(),
    ];

    assert_eq!(
        kinds,
        [
            Some(ErrorKind::ModelUnavailable),
            Some(ErrorKind::MalformedOutput),
            Some(ErrorKind::ShapeMismatch),
            Some(ErrorKind::SchemaViolation),
        ]
    );
    assert_eq!(backend.calls(), 4);
}

#[tokio::test]
async fn test_backend_reported_timeout_skips_validation() {
    let backend = ScriptedBackend::new(vec![Err(BackendError::new(CODE_TIMEOUT, "deadline"))]);
    let orch = orchestrator(backend, Duration::from_secs(1));

    let out = orch.orchestrate(&RequestContext::list_campaigns()).await;

    assert_eq!(out.result.kind(), Some(ErrorKind::Timeout));
    assert!(!out.visited(OrchestrationState::Validating));
}

#[tokio::test]
async fn test_requests_share_no_state() {
    // A POST does not make a later GET see the created resource
    // POST不会让之后的GET看到已创建的资源
    let created = CAMPAIGN.to_string();
    let other = CAMPAIGN.replace("Spring Sale", "Unrelated");
    let backend = ScriptedBackend::new(vec![Ok(created), Ok(other)]);
    let orch = orchestrator(backend.clone(), Duration::from_secs(1));

    let post = orch
        .orchestrate(&RequestContext::create_campaign(r#"{"name":"Spring Sale"}"#))
        .await;
    let get = orch.orchestrate(&RequestContext::get_campaign(ID)).await;

    let name = |r: &OrchestrationResult| match r {
        OrchestrationResult::Success {
            payload: Payload::Single(c),
        } => c.name.clone(),
        other => panic!("unexpected result: {other:?}"),
    };
    assert_eq!(name(&post.result), "Spring Sale");
    assert_eq!(name(&get.result), "Unrelated");

    // The GET prompt carries nothing from the POST / GET提示不包含POST的任何内容
    let prompts = backend.prompts();
    assert!(!prompts[1].contains("creation payload"));
    assert_ne!(post.request_id, get.request_id);
}

#[tokio::test]
async fn test_list_prompt_is_same_for_every_list_call() {
    let backend = ScriptedBackend::always("[]");
    let orch = orchestrator(backend.clone(), Duration::from_secs(1));

    orch.orchestrate(&RequestContext::list_campaigns()).await;
    orch.orchestrate(&RequestContext::list_campaigns()).await;

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn test_empty_model_list_is_success() {
    let backend = ScriptedBackend::always("Nothing matched: []");
    let orch = orchestrator(backend, Duration::from_secs(1));

    let out = orch.orchestrate(&RequestContext::list_campaigns()).await;

    assert_eq!(
        out.result,
        OrchestrationResult::Success {
            payload: Payload::List(vec![])
        }
    );
}
