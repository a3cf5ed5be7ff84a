//! HTTP gateway server / HTTP网关服务器

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, info};

use super::state::{create_gateway_router, GatewayState};

/// Campaign API HTTP gateway / 活动API HTTP网关
pub struct HttpGateway {
    addr: SocketAddr,
    state: GatewayState,
    cors_enabled: bool,
    request_timeout: Duration,
}

impl HttpGateway {
    /// Create a new HTTP gateway / 创建新的HTTP网关
    pub fn new(
        addr: SocketAddr,
        state: GatewayState,
        cors_enabled: bool,
        request_timeout: Duration,
    ) -> Self {
        Self {
            addr,
            state,
            cors_enabled,
            request_timeout,
        }
    }

    /// Start HTTP gateway with shutdown signal / 使用关闭信号启动HTTP网关
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let (listener, app) = self.prepare().await?;
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            error!("HTTP gateway error: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    async fn prepare(self) -> Result<(tokio::net::TcpListener, axum::Router)> {
        info!("Starting HTTP gateway on {}", self.addr);
        let app = create_gateway_router(self.state, self.cors_enabled, self.request_timeout);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let local = listener.local_addr()?;
        info!(
            cors = self.cors_enabled,
            request_timeout_ms = self.request_timeout.as_millis() as u64,
            "HTTP gateway listening on {}",
            local
        );
        info!("API endpoint: {}", api_endpoint(local));
        Ok((listener, app))
    }
}

/// Base URL clients should call / 客户端应调用的基础URL
pub fn api_endpoint(addr: SocketAddr) -> String {
    let host = if addr.ip().is_unspecified() {
        "localhost".to_string()
    } else {
        addr.ip().to_string()
    };
    let host = if addr.is_ipv6() && host != "localhost" {
        format!("[{}]", host)
    } else {
        host
    };
    format!("http://{}:{}/campaigns", host, addr.port())
}
