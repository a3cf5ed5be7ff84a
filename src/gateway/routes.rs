//! HTTP routes for the campaign API
//! 活动API的HTTP路由

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_campaign, get_campaign, health_check, list_campaigns, unsupported_route,
};
use super::GatewayState;

/// Create HTTP routes / 创建HTTP路由
pub(crate) fn create_routes(state: GatewayState) -> Router {
    Router::new()
        // Campaign endpoints / 活动端点
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/{id}", get(get_campaign))
        // Health check / 健康检查
        .route("/health", get(health_check))
        // Anything else is an invalid request / 其他请求均视为无效请求
        .method_not_allowed_fallback(unsupported_route)
        .fallback(unsupported_route)
        .with_state(state)
}
