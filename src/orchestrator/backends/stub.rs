use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::orchestrator::invoker::{BackendError, ModelBackend};
use crate::orchestrator::prompt::USER_INPUT_MARKER;
use crate::orchestrator::validator::extract_first_json;

const ADJECTIVES: [&str; 6] = ["Spring", "Summer", "Holiday", "Flash", "Loyalty", "Launch"];
const NOUNS: [&str; 5] = ["Sale", "Promo", "Giveaway", "Drive", "Blitz"];

/// Offline backend that fabricates campaigns / 离线生成活动数据的后端
pub struct StubBackend {
    name: String,
}

impl StubBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

fn parse_list_bounds(clause: &str) -> Option<(u32, u32)> {
    let rest = clause.split("between ").nth(1)?;
    let mut words = rest.split_whitespace();
    let min = words.next()?.parse::<u32>().ok()?;
    if words.next()? != "and" {
        return None;
    }
    let max = words.next()?.parse::<u32>().ok()?;
    Some((min, max))
}

fn parse_quoted_after<'a>(clause: &'a str, marker: &str) -> Option<&'a str> {
    let rest = clause.split(marker).nth(1)?;
    let rest = rest.strip_prefix('"')?;
    rest.split('"').next()
}

fn fabricate_campaign() -> Map<String, Value> {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Seasonal");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Campaign");
    let start: NaiveDate = Utc::now().date_naive() + ChronoDuration::days(rng.gen_range(-60..60));
    let end = start + ChronoDuration::days(rng.gen_range(7..90));

    let mut obj = Map::new();
    obj.insert("uuid".to_string(), json!(uuid::Uuid::new_v4().to_string()));
    obj.insert(
        "name".to_string(),
        json!(format!("{} {} {}", adjective, noun, rng.gen_range(1..100))),
    );
    obj.insert(
        "startDate".to_string(),
        json!(start.format("%Y-%m-%d").to_string()),
    );
    obj.insert(
        "endDate".to_string(),
        json!(end.format("%Y-%m-%d").to_string()),
    );
    obj.insert("isActive".to_string(), json!(rng.gen_bool(0.5)));
    obj
}

fn respond(clause: &str) -> Value {
    if clause.contains("JSON array") {
        let (min, max) = parse_list_bounds(clause).unwrap_or((1, 3));
        let count = rand::thread_rng().gen_range(min..=max.max(min));
        return Value::Array(
            (0..count)
                .map(|_| Value::Object(fabricate_campaign()))
                .collect(),
        );
    }

    let mut obj = fabricate_campaign();
    if let Some(id) = parse_quoted_after(clause, "whose uuid is ") {
        obj.insert("uuid".to_string(), json!(id));
    } else if let Some(payload) = clause
        .split("creation payload:")
        .nth(1)
        .and_then(extract_first_json)
    {
        if let Value::Object(fields) = payload {
            for (k, v) in fields {
                obj.insert(k, v);
            }
        }
    }
    Value::Object(obj)
}

#[async_trait]
impl ModelBackend for StubBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, BackendError> {
        let clause = prompt
            .split_once(USER_INPUT_MARKER)
            .map(|(_, c)| c)
            .unwrap_or(prompt);
        Ok(format!(
            "Here is the API response you asked for: {}",
            respond(clause)
        ))
    }
}
