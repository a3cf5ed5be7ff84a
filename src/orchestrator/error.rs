//! Orchestration error types / 编排错误类型

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classification surfaced to the HTTP boundary / 向HTTP边界暴露的失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed inbound context, never reaches the model / 入站上下文格式错误，不会到达模型
    InvalidRequest,
    /// Backend call failed / 后端调用失败
    ModelUnavailable,
    /// Backend call exceeded its bound / 后端调用超时
    Timeout,
    /// No parseable structure in the reply / 回复中没有可解析的结构
    MalformedOutput,
    /// Structure found with the wrong cardinality / 结构基数错误
    ShapeMismatch,
    /// Field-level contract broken / 字段级约定被破坏
    SchemaViolation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::ModelUnavailable => "model_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::MalformedOutput => "malformed_output",
            ErrorKind::ShapeMismatch => "shape_mismatch",
            ErrorKind::SchemaViolation => "schema_violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Orchestration error types / 编排错误类型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestrationError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Model call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Malformed model output: {message}")]
    MalformedOutput { message: String },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Schema violation on field `{field}`: {message}")]
    SchemaViolation { field: String, message: String },
}

impl OrchestrationError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn schema_violation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// Human-readable detail without the kind prefix / 不带类型前缀的可读详情
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidRequest { message }
            | Self::ModelUnavailable { message }
            | Self::MalformedOutput { message } => message.clone(),
            Self::Timeout { timeout_ms } => format!("no reply within {}ms", timeout_ms),
            Self::ShapeMismatch { expected, actual } => {
                format!("expected {}, got {}", expected, actual)
            }
            Self::SchemaViolation { field, message } => format!("{}: {}", field, message),
        }
    }
}
