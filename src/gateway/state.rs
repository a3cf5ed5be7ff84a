//! Gateway state and router assembly / 网关状态与路由组装

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use super::routes::create_routes;
use crate::orchestrator::Orchestrator;

/// Shared state for all handlers / 所有处理器共享的状态
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
}

impl GatewayState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Create HTTP gateway router / 创建HTTP网关路由器
pub fn create_gateway_router(
    state: GatewayState,
    cors_enabled: bool,
    request_timeout: Duration,
) -> Router {
    let router = create_routes(state).layer(TimeoutLayer::new(request_timeout));
    if cors_enabled {
        // Add CORS support / 添加CORS支持
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
