//! Gateway configuration / 网关配置
//!
//! Sources, lowest to highest priority:
//! 配置来源，优先级从低到高：
//! defaults -> TOML file -> `GENAPI_*` environment -> command line flags

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{AppConfig, LogConfig, ServerConfig};
use crate::orchestrator::{BackendKind, ModelConfig, PromptConfig};

/// Margin added to the model timeout for the outer HTTP bound
/// 外层HTTP超时在模型超时基础上增加的余量
pub const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Command line arguments for genapi / genapi命令行参数
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "genapi",
    version = "0.1.0",
    about = "Generative REST API - campaign resources fabricated by a language model\n生成式REST API - 由语言模型生成的活动资源"
)]
pub struct CliArgs {
    /// Configuration file path / 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path / 配置文件路径"
    )]
    pub config: Option<String>,

    /// HTTP listen address / HTTP监听地址
    #[arg(
        long,
        value_name = "ADDR",
        help = "HTTP listen address (e.g., 0.0.0.0:8080) / HTTP监听地址"
    )]
    pub http_addr: Option<String>,

    /// Model backend kind / 模型后端类型
    #[arg(
        long,
        value_name = "KIND",
        help = "Model backend (stub, openai_chat_completion, ollama_chat) / 模型后端"
    )]
    pub backend: Option<String>,

    /// Model identifier / 模型标识
    #[arg(long, value_name = "MODEL", help = "Model identifier / 模型标识")]
    pub model_id: Option<String>,

    /// Backend base URL / 后端基础URL
    #[arg(long, value_name = "URL", help = "Backend base URL / 后端基础URL")]
    pub base_url: Option<String>,

    /// Model call timeout / 模型调用超时
    #[arg(
        long,
        value_name = "MS",
        help = "Model call timeout in milliseconds / 模型调用超时（毫秒）"
    )]
    pub timeout_ms: Option<u64>,

    /// Log level / 日志级别
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level (trace, debug, info, warn, error) / 日志级别"
    )]
    pub log_level: Option<String>,
}

/// Gateway configuration / 网关配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server / HTTP服务器
    pub http: ServerConfig,
    /// Logging / 日志
    pub log: LogConfig,
    /// Model backend / 模型后端
    pub model: ModelConfig,
    /// Prompt shaping / 提示构造
    pub prompt: PromptConfig,
}

impl AppConfig for GatewayConfig {
    fn default_config() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        self.model.validate()?;
        if self.prompt.list_min_items == 0 {
            bail!("prompt.list_min_items must be at least 1");
        }
        if self.prompt.list_min_items > self.prompt.list_max_items {
            bail!(
                "prompt.list_min_items ({}) exceeds prompt.list_max_items ({})",
                self.prompt.list_min_items,
                self.prompt.list_max_items
            );
        }
        // The model bound must fire first so a slow model surfaces as a 504 with a body.
        if let Some(ms) = self.http.request_timeout_ms {
            if ms <= self.model.timeout_ms {
                bail!(
                    "http.request_timeout_ms ({}) must exceed model.timeout_ms ({})",
                    ms,
                    self.model.timeout_ms
                );
            }
        }
        Ok(())
    }
}

impl GatewayConfig {
    /// Outer request bound / 外层请求时间上限
    pub fn request_timeout(&self) -> Duration {
        match self.http.request_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => self.model.timeout() + REQUEST_TIMEOUT_MARGIN,
        }
    }

    /// Resolve the config file: explicit path first, then the home location
    /// 解析配置文件：优先使用显式路径，其次是主目录位置
    pub fn resolve_config_path(args: &CliArgs) -> Option<PathBuf> {
        if let Some(p) = &args.config {
            return Some(PathBuf::from(p));
        }
        let home_path = match std::env::var_os("GENAPI_HOME") {
            Some(dir) => PathBuf::from(dir).join("config.toml"),
            None => PathBuf::from(std::env::var_os("HOME")?)
                .join(".genapi")
                .join("config.toml"),
        };
        home_path.exists().then_some(home_path)
    }

    /// Load configuration and apply CLI overrides / 加载配置并应用命令行覆盖
    pub fn load_with_cli(args: &CliArgs) -> Result<Self> {
        let path = Self::resolve_config_path(args);
        let mut config = Self::load_layered(path.as_deref())?;

        if let Some(addr) = &args.http_addr {
            config.http.addr = addr
                .parse()
                .with_context(|| format!("invalid --http-addr: {}", addr))?;
        }
        if let Some(kind) = &args.backend {
            config.model.backend = kind.parse::<BackendKind>()?;
        }
        if let Some(model_id) = &args.model_id {
            config.model.model_id = model_id.clone();
        }
        if let Some(base_url) = &args.base_url {
            config.model.base_url = base_url.clone();
        }
        if let Some(ms) = args.timeout_ms {
            config.model.timeout_ms = ms;
        }
        if let Some(level) = &args.log_level {
            config.log.level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
