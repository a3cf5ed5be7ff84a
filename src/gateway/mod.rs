//! HTTP gateway for the generative campaign API
//! 生成式活动API的HTTP网关
//!
//! The gateway is the routing layer: it maps HTTP calls onto `RequestContext`
//! values and orchestration results back onto HTTP responses.
//! 网关是路由层：将HTTP调用映射为`RequestContext`，并将编排结果映射回HTTP响应。

pub mod config;
pub mod handlers;
pub mod http_gateway;
pub mod routes;
pub mod state;

#[cfg(test)]
pub mod handlers_test;

pub use config::{CliArgs, GatewayConfig};
pub use http_gateway::HttpGateway;
pub use state::{create_gateway_router, GatewayState};
