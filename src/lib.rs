//! Generative API: a REST facade whose resources are fabricated by a language model
//! Generative API：由语言模型生成资源的REST外观服务
//!
//! Each inbound request is turned into a single prompt, the model is invoked
//! exactly once, and its free-text reply is validated into a typed response.
//! 每个入站请求被转换为单个提示，模型只调用一次，其文本回复被校验为类型化响应。

// Shared modules / 共享模块
pub mod config;

// Service-specific modules / 服务特定模块
pub mod gateway;
pub mod orchestrator;

// Re-exports / 重新导出
pub use orchestrator::{
    ErrorKind, OrchestrationError, OrchestrationResult, Orchestrator, RequestContext,
};
