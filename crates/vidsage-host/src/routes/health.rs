use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Liveness of the host itself; says nothing about the remote backend
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let backend_configured = match state.dispatcher.storage().backend_url().await {
        Ok(url) => url.is_configured(),
        Err(e) => {
            tracing::warn!("Could not read settings: {}", e);
            false
        }
    };

    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "backendConfigured": backend_configured,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
