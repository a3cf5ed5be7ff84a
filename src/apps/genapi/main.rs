//! genapi main entry point
//! genapi 主入口点

use clap::Parser;
use generative_api::config::init_tracing;
use generative_api::gateway::{CliArgs, GatewayConfig, GatewayState, HttpGateway};
use generative_api::orchestrator::{
    build_backend, ModelInvoker, Orchestrator, PromptBuilder, ResponseValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments / 解析命令行参数
    let args = CliArgs::parse();
    let log_args = format!("{:?}", args);

    // Load configuration, then apply CLI overrides / 加载配置，然后应用命令行覆盖
    let config = GatewayConfig::load_with_cli(&args)?;

    // Initialize logging with configuration / 使用配置初始化日志
    init_tracing(&config.log.to_logging_config())?;

    tracing::info!("Starting genapi with args: {}", log_args);
    tracing::info!("genapi starting with:");
    tracing::info!("  - HTTP gateway on: {}", config.http.addr);
    tracing::info!("  - Model backend: {}", config.model.backend);
    tracing::info!("  - Model timeout: {}ms", config.model.timeout_ms);
    tracing::info!(
        "  - List size: {}..={}",
        config.prompt.list_min_items,
        config.prompt.list_max_items
    );

    // Build the orchestration pipeline / 构建编排流水线
    let backend = build_backend(&config.model)?;
    let orchestrator = Orchestrator::new(
        PromptBuilder::new(config.prompt.clone()),
        ModelInvoker::new(backend, config.model.timeout()),
        ResponseValidator::new(),
    );

    // Initialize HTTP gateway / 初始化HTTP网关
    let http_gateway = HttpGateway::new(
        config.http.addr,
        GatewayState::new(orchestrator),
        config.http.cors_enabled,
        config.request_timeout(),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = http_gateway
            .start_with_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            tracing::error!("HTTP gateway error: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("genapi shutting down");
    let _ = shutdown_tx.send(());

    let timeout = std::time::Duration::from_secs(5);
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if http_handle.is_finished() {
            break;
        }
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!("Shutdown timeout reached, aborting server");
            http_handle.abort();
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    Ok(())
}
