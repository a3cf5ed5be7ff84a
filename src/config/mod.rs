//! Configuration management for the generative API service
//! 生成式API服务的配置管理
//!
//! This module provides a layered configuration framework that supports:
//! - Configuration files (TOML) / 配置文件（TOML）
//! - Environment variables / 环境变量
//! - Command line arguments / 命令行参数
//!
//! Service-specific configuration (see `gateway::config`) builds on the shared
//! base structures defined here.
//! 服务特定配置（见`gateway::config`）基于此处定义的共享基础结构。

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Base configuration shared by all applications / 所有应用程序共享的基础配置
pub mod base;
pub use base::*;

/// Environment variable prefix / 环境变量前缀
pub const ENV_PREFIX: &str = "GENAPI_";

/// Base configuration trait / 基础配置特征
/// All application configurations should implement this trait
/// 所有应用程序配置都应该实现此特征
pub trait AppConfig: for<'de> Deserialize<'de> + Serialize + Clone + std::fmt::Debug {
    /// Get default configuration values
    /// 获取默认配置值
    fn default_config() -> Self;

    /// Load configuration from defaults, an optional TOML file and the environment
    /// 从默认值、可选的TOML文件和环境变量加载配置
    ///
    /// Precedence order (highest to lowest):
    /// 优先级顺序（从高到低）：
    /// 1. Environment variables (`GENAPI_`, `__` for nesting) / 环境变量
    /// 2. Configuration file / 配置文件
    /// 3. Default values / 默认值
    ///
    /// Command line overrides are applied by the caller on top of the result.
    /// 命令行覆盖由调用方在结果之上应用。
    fn load_layered(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        if let Some(path) = path {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to load configuration")
    }

    /// Validate the configuration
    /// 验证配置
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Common logging configuration / 通用日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive / 日志级别或过滤指令
    pub level: String,
    /// Log format (json, compact, pretty) / 日志格式
    pub format: String,
    /// Optional log file path / 可选日志文件路径
    pub file_path: Option<PathBuf>,
}

static FILE_LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

/// Initialize tracing based on logging configuration
/// 基于日志配置初始化跟踪
///
/// `RUST_LOG` takes precedence over the configured level.
/// `RUST_LOG`优先于配置的日志级别。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config.level.trim().is_empty() {
            EnvFilter::new("info")
        } else {
            EnvFilter::new(config.level.clone())
        }
    });

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stdout_layer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .with_level(true)
            .boxed(),
        "compact" => fmt::layer()
            .compact()
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .with_level(true)
            .boxed(),
        _ => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .with_level(true)
            .boxed(),
    };
    layers.push(stdout_layer);

    if let Some(path) = config.file_path.as_ref() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create log dir: {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);
        let _ = FILE_LOG_GUARD.set(guard);

        // Files always get machine-readable output / 文件始终使用机器可读格式
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .with_level(true)
            .with_ansi(false)
            .with_writer(file_writer)
            .boxed();
        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct SampleConfig {
        name: String,
        server: ServerConfig,
    }

    impl Default for SampleConfig {
        fn default() -> Self {
            Self {
                name: "sample".to_string(),
                server: ServerConfig::default(),
            }
        }
    }

    impl AppConfig for SampleConfig {
        fn default_config() -> Self {
            Self::default()
        }
    }

    #[test]
    #[serial]
    fn test_load_layered_defaults_only() {
        let cfg = SampleConfig::load_layered(None).unwrap();
        assert_eq!(cfg, SampleConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_layered_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"\n[server]\naddr = \"127.0.0.1:7000\"").unwrap();

        std::env::set_var("GENAPI_SERVER__CORS_ENABLED", "false");
        let cfg = SampleConfig::load_layered(Some(file.path()));
        std::env::remove_var("GENAPI_SERVER__CORS_ENABLED");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.name, "from-file");
        assert_eq!(cfg.server.addr, "127.0.0.1:7000".parse().unwrap());
        assert!(!cfg.server.cors_enabled);
    }

    #[test]
    #[serial]
    fn test_load_layered_missing_file_is_error() {
        let err = SampleConfig::load_layered(Some(Path::new("/nonexistent/genapi.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
