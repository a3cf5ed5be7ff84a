//! Campaign resource schema and field checks
//! 活动资源模式与字段校验
//!
//! The model is untrusted: every field of a candidate object is checked for
//! presence, primitive type and format before it becomes a `CampaignResource`.
//! Values are kept verbatim and fields outside the required set are carried
//! through untouched.
//! 模型不可信：候选对象的每个字段都会检查存在性、基本类型和格式。值保持原样，额外字段原样保留。

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::error::OrchestrationError;

/// Primitive JSON type of a field / 字段的JSON基本类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
        }
    }

    fn matches(&self, v: &Value) -> bool {
        match self {
            FieldType::String => v.is_string(),
            FieldType::Boolean => v.is_boolean(),
        }
    }
}

/// A required field of the resource contract / 资源约定中的必填字段
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub description: &'static str,
}

pub const FIELD_UUID: &str = "uuid";
pub const FIELD_NAME: &str = "name";
pub const FIELD_START_DATE: &str = "startDate";
pub const FIELD_END_DATE: &str = "endDate";
pub const FIELD_IS_ACTIVE: &str = "isActive";

/// Required fields in check order / 按校验顺序排列的必填字段
pub const REQUIRED_FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: FIELD_UUID,
        ty: FieldType::String,
        description: "RFC 4122 UUID in 8-4-4-4-12 hex form",
    },
    FieldSpec {
        name: FIELD_NAME,
        ty: FieldType::String,
        description: "non-empty campaign name",
    },
    FieldSpec {
        name: FIELD_START_DATE,
        ty: FieldType::String,
        description: "ISO-8601 date (YYYY-MM-DD)",
    },
    FieldSpec {
        name: FIELD_END_DATE,
        ty: FieldType::String,
        description: "ISO-8601 date (YYYY-MM-DD)",
    },
    FieldSpec {
        name: FIELD_IS_ACTIVE,
        ty: FieldType::Boolean,
        description: "whether the campaign is running",
    },
];

/// A campaign fabricated by the model / 由模型生成的活动
///
/// `endDate` is not required to follow `startDate`.
/// 不要求`endDate`晚于`startDate`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResource {
    pub uuid: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
    /// Fields beyond the required set / 必填字段之外的字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .unwrap_or_else(|e| panic!("invalid uuid pattern: {e}"))
    })
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap_or_else(|e| panic!("invalid date pattern: {e}"))
    })
}

pub fn is_valid_uuid(s: &str) -> bool {
    uuid_pattern().is_match(s)
}

/// Calendar date or full RFC 3339 timestamp / 日历日期或完整RFC 3339时间戳
pub fn is_valid_iso_date(s: &str) -> bool {
    if date_pattern().is_match(s) {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
    }
    DateTime::parse_from_rfc3339(s).is_ok()
}

/// Check one candidate value against the contract / 按约定检查一个候选值
pub fn check_resource(value: Value) -> Result<CampaignResource, OrchestrationError> {
    let mut obj = match value {
        Value::Object(obj) => obj,
        other => {
            return Err(OrchestrationError::schema_violation(
                "<item>",
                format!("expected object, got {}", json_type_name(&other)),
            ))
        }
    };

    for spec in REQUIRED_FIELDS.iter() {
        match obj.get(spec.name) {
            None => {
                return Err(OrchestrationError::schema_violation(
                    spec.name,
                    "missing required field",
                ))
            }
            Some(v) if !spec.ty.matches(v) => {
                return Err(OrchestrationError::schema_violation(
                    spec.name,
                    format!("expected {}, got {}", spec.ty.as_str(), json_type_name(v)),
                ))
            }
            Some(_) => {}
        }
    }

    let uuid = take_string(&mut obj, FIELD_UUID);
    let name = take_string(&mut obj, FIELD_NAME);
    let start_date = take_string(&mut obj, FIELD_START_DATE);
    let end_date = take_string(&mut obj, FIELD_END_DATE);
    let is_active = obj
        .remove(FIELD_IS_ACTIVE)
        .and_then(|v| v.as_bool())
        .unwrap_or_default();

    if name.is_empty() {
        return Err(OrchestrationError::schema_violation(
            FIELD_NAME,
            "must not be empty",
        ));
    }
    if !is_valid_uuid(&uuid) {
        return Err(OrchestrationError::schema_violation(
            FIELD_UUID,
            format!("not an 8-4-4-4-12 hex uuid: {:?}", uuid),
        ));
    }
    for (field, v) in [(FIELD_START_DATE, &start_date), (FIELD_END_DATE, &end_date)] {
        if !is_valid_iso_date(v) {
            return Err(OrchestrationError::schema_violation(
                field,
                format!("not an ISO-8601 date: {:?}", v),
            ));
        }
    }

    Ok(CampaignResource {
        uuid,
        name,
        start_date,
        end_date,
        is_active,
        extra: obj,
    })
}

fn take_string(obj: &mut Map<String, Value>, key: &str) -> String {
    match obj.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

pub(crate) fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
