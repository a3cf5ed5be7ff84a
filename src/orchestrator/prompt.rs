//! Prompt builder / 提示构建器
//!
//! Produces one flattened instruction string per call: a fixed system block
//! describing the API contract, followed by a clause derived from the route.
//! 每次调用生成一个扁平化的指令字符串：固定的系统说明块加上由路由派生的用户输入子句。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::context::{Route, COLLECTION_PATH, ITEM_PATH};
use super::schema::REQUIRED_FIELDS;

/// A single-line prompt / 单行提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prompt configuration / 提示配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Minimum items requested for list routes / 列表路由请求的最少条目数
    pub list_min_items: u32,
    /// Maximum items requested for list routes / 列表路由请求的最多条目数
    pub list_max_items: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            list_min_items: 1,
            list_max_items: 3,
        }
    }
}

/// Marker preceding the per-call clause / 每次调用子句之前的标记
pub const USER_INPUT_MARKER: &str = "User input:";

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    config: PromptConfig,
    system_block: String,
}

impl PromptBuilder {
    pub fn new(config: PromptConfig) -> Self {
        Self {
            config,
            system_block: system_block(),
        }
    }

    pub fn build(&self, route: &Route) -> PromptText {
        let clause = match route {
            Route::ListCampaigns => format!(
                "{} GET {}. Return a JSON array containing between {} and {} campaign objects.",
                USER_INPUT_MARKER,
                COLLECTION_PATH,
                self.config.list_min_items,
                self.config.list_max_items
            ),
            Route::GetCampaign { id } => format!(
                "{} GET {}/{}. Return exactly one JSON campaign object whose uuid is \"{}\".",
                USER_INPUT_MARKER, COLLECTION_PATH, id, id
            ),
            Route::CreateCampaign { body } => format!(
                "{} POST {} with creation payload: {} . Return exactly one JSON campaign object \
                 representing the created campaign, echoing the payload fields and assigning a \
                 new uuid if none is given.",
                USER_INPUT_MARKER, COLLECTION_PATH, body
            ),
        };
        PromptText(flatten(&format!("{} {}", self.system_block, clause)))
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(PromptConfig::default())
    }
}

fn system_block() -> String {
    let fields = REQUIRED_FIELDS
        .iter()
        .map(|f| format!("{} ({}, {})", f.name, f.ty.as_str(), f.description))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You are a REST API that manages marketing campaigns. Act as the API itself and \
         respond only with valid JSON that matches the Campaign schema, with no explanations. \
         Every campaign object must contain these required fields: {}. \
         The API accepts only the methods GET and POST, and only the paths {} and {}.",
        fields, COLLECTION_PATH, ITEM_PATH
    )
}

/// Replace every line break and control character with a single space;
/// CRLF counts as one break.
/// 将所有换行和控制字符替换为单个空格；CRLF视为一次换行。
fn flatten(s: &str) -> String {
    s.replace("\r\n", " ")
        .replace(|c: char| c.is_control() || c == '\u{2028}' || c == '\u{2029}', " ")
}
