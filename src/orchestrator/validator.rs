//! Response validation / 响应校验
//!
//! Model replies are free text. The validator pulls the first JSON value out
//! of the text, checks its cardinality against the route and then checks every
//! resource against the campaign contract.
//! 模型回复是自由文本。校验器从文本中提取第一个JSON值，按路由检查基数，再按活动约定检查每个资源。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use super::context::Shape;
use super::error::OrchestrationError;
use super::schema::{check_resource, json_type_name, CampaignResource};

/// Validated payload / 已校验的负载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Single(CampaignResource),
    List(Vec<CampaignResource>),
}

impl Payload {
    pub fn shape(&self) -> Shape {
        match self {
            Payload::Single(_) => Shape::Single,
            Payload::List(_) => Shape::List,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Single(_) => 1,
            Payload::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, raw: &str, shape: Shape) -> Result<Payload, OrchestrationError> {
        trace!(raw_len = raw.len(), "validating model output");
        let value = extract_first_json(raw).ok_or_else(|| OrchestrationError::MalformedOutput {
            message: "no JSON object or array found in model output".to_string(),
        })?;

        match (shape, value) {
            (Shape::Single, Value::Object(obj)) => {
                check_resource(Value::Object(obj)).map(Payload::Single)
            }
            (Shape::List, Value::Array(items)) => validate_list(items).map(Payload::List),
            (shape, other) => Err(OrchestrationError::ShapeMismatch {
                expected: shape.as_str(),
                actual: json_type_name(&other),
            }),
        }
    }
}

/// Keep valid items and drop the rest; an all-invalid non-empty list fails
/// 保留有效条目并丢弃其余条目；非空列表全部无效时失败
fn validate_list(items: Vec<Value>) -> Result<Vec<CampaignResource>, OrchestrationError> {
    let total = items.len();
    let mut kept = Vec::with_capacity(total);
    let mut first_violation = None;

    for (index, item) in items.into_iter().enumerate() {
        match check_resource(item) {
            Ok(resource) => kept.push(resource),
            Err(e) => {
                warn!(index, error = %e, "dropping invalid list item");
                if first_violation.is_none() {
                    first_violation = Some(e);
                }
            }
        }
    }

    match first_violation {
        Some(e) if kept.is_empty() => Err(e),
        _ => Ok(kept),
    }
}

/// Find the first parseable JSON object or array in free text
/// 在自由文本中找到第一个可解析的JSON对象或数组
///
/// The earliest value that parses wins, even an empty `[]` or `{}` sitting in
/// prose ahead of the real payload; the shape check then rejects it.
/// 最早可解析的值优先，即使是出现在正文前面的空`[]`或`{}`；随后由形状检查拒绝。
pub fn extract_first_json(raw: &str) -> Option<Value> {
    for (idx, ch) in raw.char_indices() {
        if ch != '{' && ch != '[' {
            continue;
        }
        let slice = &raw[idx..];
        let mut deserializer = serde_json::Deserializer::from_str(slice);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            return Some(value);
        }
    }
    None
}
