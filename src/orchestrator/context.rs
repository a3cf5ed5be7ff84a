//! Inbound request context / 入站请求上下文
//!
//! A `RequestContext` is what the routing layer hands to the orchestrator. It is
//! checked once and turned into a `Route`, which is the only input the prompt
//! builder accepts.
//! `RequestContext`由路由层交给编排器，校验后转换为`Route`，这是提示构建器唯一接受的输入。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::OrchestrationError;

/// Route pattern for the collection / 集合路由模式
pub const COLLECTION_PATH: &str = "/campaigns";
/// Route pattern for a single resource / 单个资源路由模式
pub const ITEM_PATH: &str = "/campaigns/{id}";
/// Path parameter carrying the resource id / 携带资源ID的路径参数
pub const ID_PARAM: &str = "id";

/// HTTP method / HTTP方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            other => Err(OrchestrationError::invalid_request(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

/// Expected cardinality of the reply / 期望的回复基数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Single,
    List,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Single => "object",
            Shape::List => "array",
        }
    }
}

/// One inbound call / 一次入站调用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub method: Method,
    /// Normalized route pattern, e.g. `/campaigns/{id}` / 规范化路由模式
    pub path: String,
    #[serde(default)]
    pub path_params: HashMap<String, String>,
    pub body: Option<String>,
}

impl RequestContext {
    pub fn list_campaigns() -> Self {
        Self {
            method: Method::Get,
            path: COLLECTION_PATH.to_string(),
            path_params: HashMap::new(),
            body: None,
        }
    }

    pub fn get_campaign(id: impl Into<String>) -> Self {
        let mut path_params = HashMap::new();
        path_params.insert(ID_PARAM.to_string(), id.into());
        Self {
            method: Method::Get,
            path: ITEM_PATH.to_string(),
            path_params,
            body: None,
        }
    }

    pub fn create_campaign(body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: COLLECTION_PATH.to_string(),
            path_params: HashMap::new(),
            body: Some(body.into()),
        }
    }

    /// Check the context invariants and classify the call
    /// 检查上下文不变量并对调用进行分类
    pub fn route(&self) -> Result<Route, OrchestrationError> {
        let id = self.path_params.get(ID_PARAM);
        let expects_id = self.path.contains("{id}");

        if expects_id && id.map(|v| v.trim().is_empty()).unwrap_or(true) {
            return Err(OrchestrationError::invalid_request(format!(
                "route {} requires a non-empty `id` path parameter",
                self.path
            )));
        }
        if !expects_id && id.is_some() {
            return Err(OrchestrationError::invalid_request(format!(
                "route {} does not take an `id` path parameter",
                self.path
            )));
        }

        match (self.method, &self.body) {
            (Method::Get, Some(_)) => {
                return Err(OrchestrationError::invalid_request(
                    "GET requests must not carry a body",
                ))
            }
            (Method::Post, None) => {
                return Err(OrchestrationError::invalid_request(
                    "POST requests require a creation payload",
                ))
            }
            (Method::Post, Some(b)) if b.trim().is_empty() => {
                return Err(OrchestrationError::invalid_request(
                    "POST requests require a non-empty creation payload",
                ))
            }
            _ => {}
        }

        match (self.method, self.path.as_str()) {
            (Method::Get, COLLECTION_PATH) => Ok(Route::ListCampaigns),
            (Method::Get, ITEM_PATH) => Ok(Route::GetCampaign {
                id: id.cloned().unwrap_or_default(),
            }),
            (Method::Post, COLLECTION_PATH) => Ok(Route::CreateCampaign {
                body: self.body.clone().unwrap_or_default(),
            }),
            (method, path) => Err(OrchestrationError::invalid_request(format!(
                "unsupported route: {} {}",
                method, path
            ))),
        }
    }
}

/// A validated call shape / 已校验的调用形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ListCampaigns,
    GetCampaign { id: String },
    CreateCampaign { body: String },
}

impl Route {
    pub fn shape(&self) -> Shape {
        match self {
            Route::ListCampaigns => Shape::List,
            Route::GetCampaign { .. } | Route::CreateCampaign { .. } => Shape::Single,
        }
    }
}
