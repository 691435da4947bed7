//! Operational HTTP endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::warn;

use crate::state::AppState;

/// `GET /health` — liveness plus a few gauges worth a glance.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let active_subscriptions = match state.store.find_active(None).await {
        Ok(subs) => Some(subs.len()),
        Err(e) => {
            warn!(error = %e, "Health check could not count subscriptions");
            None
        }
    };

    Json(serde_json::json!({
        "status": "ok",
        "channel": state.channel_name,
        "uptime_secs": (Utc::now() - state.started_at).num_seconds(),
        "catalog_venues": state.cache.snapshot().await.len(),
        "active_subscriptions": active_subscriptions,
    }))
}

/// `GET /config` — redacted runtime configuration.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.config.redacted_summary())
}
