use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and the active analysis backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "byenote",
        "analysis": state.analyzer.backend(),
        "model": state.config.emotion.api_key.as_ref().map(|_| &state.config.emotion.model),
    }))
}
