use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, and whether a model provider is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = match state.config.llm.credential() {
        Some(credential) => json!({
            "configured": true,
            "provider": credential.provider.as_str(),
            "model": state.llm.model(),
        }),
        None => json!({ "configured": false }),
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "llm": llm
    }))
}
