use audiodrop_core::constants::WELCOME_MESSAGE;
use axum::Json;
use serde_json::{json, Value};

pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
