use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::gateway::GatewayState;

/// Liveness check, never calls the model / 存活检查，不调用模型
pub async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    let invoker = state.orchestrator.invoker();
    Json(json!({
        "status": "ok",
        "backend": invoker.backend_name(),
        "model": invoker.model_id(),
        "timeout_ms": invoker.timeout().as_millis() as u64,
    }))
}
