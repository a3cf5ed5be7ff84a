//! Campaign endpoints / 活动端点
//!
//! Every handler only builds a `RequestContext`; classification, model
//! invocation and validation all happen in the orchestrator.
//! 每个处理器只构建`RequestContext`；分类、模型调用和校验都在编排器中完成。

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, Method as HttpMethod, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::gateway::GatewayState;
use crate::orchestrator::{ErrorKind, Method, Orchestration, OrchestrationResult, RequestContext};

/// Response header carrying the orchestration id / 携带编排ID的响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP status for a failure kind / 失败类型对应的HTTP状态码
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::ModelUnavailable
        | ErrorKind::MalformedOutput
        | ErrorKind::ShapeMismatch
        | ErrorKind::SchemaViolation => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(kind: ErrorKind, detail: &str) -> Response {
    (
        status_for(kind),
        Json(json!({
            "error": kind.as_str(),
            "detail": detail,
        })),
    )
        .into_response()
}

fn into_response(orchestration: Orchestration) -> Response {
    let mut response = match &orchestration.result {
        OrchestrationResult::Success { payload } => (StatusCode::OK, Json(payload)).into_response(),
        OrchestrationResult::Failure { kind, detail } => error_response(*kind, detail),
    };
    if let Ok(v) = HeaderValue::from_str(&orchestration.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    response
}

fn body_text(body: Bytes) -> Result<String, Response> {
    String::from_utf8(body.to_vec()).map_err(|e| {
        tracing::debug!(error = %e, "rejecting non UTF-8 request body");
        error_response(ErrorKind::InvalidRequest, "request body is not valid UTF-8")
    })
}

fn non_empty(body: Bytes) -> Result<Option<String>, Response> {
    let text = body_text(body)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

async fn run(state: &GatewayState, ctx: RequestContext) -> Response {
    into_response(state.orchestrator.orchestrate(&ctx).await)
}

/// GET /campaigns
pub async fn list_campaigns(State(state): State<GatewayState>, body: Bytes) -> Response {
    let mut ctx = RequestContext::list_campaigns();
    ctx.body = match non_empty(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    run(&state, ctx).await
}

/// GET /campaigns/{id}
pub async fn get_campaign(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let mut ctx = RequestContext::get_campaign(id);
    ctx.body = match non_empty(body) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    run(&state, ctx).await
}

/// POST /campaigns
///
/// The raw body is passed through; an empty body is rejected by the orchestrator.
/// 原样传递请求体；空请求体由编排器拒绝。
pub async fn create_campaign(State(state): State<GatewayState>, body: Bytes) -> Response {
    match body_text(body) {
        Ok(text) => run(&state, RequestContext::create_campaign(text)).await,
        Err(resp) => resp,
    }
}

/// Fallback for any method/path pair outside the API surface
/// API范围之外的方法/路径组合的兜底处理
pub async fn unsupported_route(method: HttpMethod, uri: Uri) -> Response {
    let detail = match method.as_str().parse::<Method>() {
        Ok(_) => format!("unsupported route: {} {}", method, uri.path()),
        Err(e) => e.detail(),
    };
    tracing::debug!(method = %method, path = %uri.path(), "rejecting unsupported route");
    error_response(ErrorKind::InvalidRequest, &detail)
}
