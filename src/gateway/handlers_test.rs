//! Tests for the campaign HTTP handlers
//! 活动HTTP处理器测试

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::gateway::handlers::{status_for, REQUEST_ID_HEADER};
use crate::gateway::{create_gateway_router, GatewayState};
use crate::orchestrator::backends::StubBackend;
use crate::orchestrator::invoker::{BackendError, ModelBackend, CODE_UPSTREAM_ERROR};
use crate::orchestrator::{
    ErrorKind, ModelInvoker, Orchestrator, PromptBuilder, ResponseValidator,
};

const CAMPAIGN: &str = r#"{"uuid":"3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b","name":"Spring Sale","startDate":"2024-03-01","endDate":"2024-03-31","isActive":true,"channel":"email"}"#;

struct FixedBackend(Result<String, BackendError>);

#[async_trait]
impl ModelBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    fn model_id(&self) -> &str {
        "fixed-model"
    }

    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, BackendError> {
        self.0.clone()
    }
}

/// Build a router around the given backend / 基于给定后端构建路由器
fn router_with(backend: Arc<dyn ModelBackend>) -> Router {
    let orchestrator = Orchestrator::new(
        PromptBuilder::default(),
        ModelInvoker::new(backend, Duration::from_secs(2)),
        ResponseValidator::new(),
    );
    create_gateway_router(GatewayState::new(orchestrator), true, Duration::from_secs(5))
}

fn fixed(reply: &str) -> Router {
    router_with(Arc::new(FixedBackend(Ok(reply.to_string()))))
}

async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Option<String>, Value) {
    send_body(router, method, uri, Body::from(body.to_string())).await
}

async fn send_body(
    router: Router,
    method: Method,
    uri: &str,
    body: Body,
) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, request_id, json)
}

#[tokio::test]
async fn test_get_campaign_returns_object() {
    let (status, request_id, json) = send(
        fixed(&format!("Here it is: {}", CAMPAIGN)),
        Method::GET,
        "/campaigns/3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b",
        "",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some());
    assert_eq!(json["uuid"], "3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b");
    assert_eq!(json["isActive"], true);
    // Extra fields survive / 额外字段被保留
    assert_eq!(json["channel"], "email");
}

#[tokio::test]
async fn test_list_campaigns_returns_array() {
    let (status, _, json) = send(
        fixed(&format!("[{}]", CAMPAIGN)),
        Method::GET,
        "/campaigns",
        "",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn test_create_campaign_with_stub_backend() {
    let (status, _, json) = send(
        router_with(Arc::new(StubBackend::new("stub"))),
        Method::POST,
        "/campaigns",
        r#"{"name":"Launch Week","isActive":true}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Launch Week");
    assert!(json["uuid"].is_string());
}

#[tokio::test]
async fn test_post_without_body_is_bad_request() {
    let (status, _, json) = send(fixed(CAMPAIGN), Method::POST, "/campaigns", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_non_utf8_body_is_bad_request() {
    let invalid = || Body::from(vec![0xffu8, 0xfe, 0xfd]);

    let (status, request_id, json) =
        send_body(fixed(CAMPAIGN), Method::POST, "/campaigns", invalid()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
    assert!(json["detail"].as_str().unwrap().contains("UTF-8"));
    assert!(request_id.is_none());

    let (status, _, json) = send_body(
        fixed(CAMPAIGN),
        Method::GET,
        "/campaigns/3f2b8c1e-9a4d-4e6f-8b7a-1c2d3e4f5a6b",
        invalid(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_get_with_body_is_bad_request() {
    let (status, _, json) = send(fixed(CAMPAIGN), Method::GET, "/campaigns", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_unsupported_routes_are_bad_request() {
    let (status, _, json) = send(fixed(CAMPAIGN), Method::DELETE, "/campaigns/abc", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");

    let (status, _, _) = send(fixed(CAMPAIGN), Method::POST, "/campaigns/abc", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, json) = send(fixed(CAMPAIGN), Method::GET, "/orders", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap_or("").contains("/orders"));
}

#[tokio::test]
async fn test_schema_violation_is_bad_gateway() {
    let (status, _, json) = send(
        fixed(r#"{"uuid":"not-a-uuid","name":"X","startDate":"2024-01-01","endDate":"2024-02-01","isActive":true}"#),
        Method::GET,
        "/campaigns/abc",
        "",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "schema_violation");
    assert!(json["detail"].as_str().unwrap_or("").starts_with("uuid"));
}

#[tokio::test]
async fn test_model_failure_is_bad_gateway() {
    let (status, _, json) = send(
        router_with(Arc::new(FixedBackend(Err(BackendError::new(
            CODE_UPSTREAM_ERROR,
            "upstream status: 500",
        ))))),
        Method::GET,
        "/campaigns",
        "",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "model_unavailable");
}

#[tokio::test]
async fn test_malformed_output_is_bad_gateway() {
    let (status, _, json) = send(fixed("no json here"), Method::GET, "/campaigns", "").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "malformed_output");
}

#[tokio::test]
async fn test_health_check() {
    let (status, _, json) = send(fixed(CAMPAIGN), Method::GET, "/health", "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["backend"], "fixed");
}

#[test]
fn test_status_mapping() {
    assert_eq!(status_for(ErrorKind::InvalidRequest), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(ErrorKind::Timeout), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(status_for(ErrorKind::ModelUnavailable), StatusCode::BAD_GATEWAY);
    assert_eq!(status_for(ErrorKind::MalformedOutput), StatusCode::BAD_GATEWAY);
    assert_eq!(status_for(ErrorKind::ShapeMismatch), StatusCode::BAD_GATEWAY);
    assert_eq!(status_for(ErrorKind::SchemaViolation), StatusCode::BAD_GATEWAY);
}
