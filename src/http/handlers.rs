//! Request handlers for the service facade.
//!
//! # Responsibilities
//! - Map the five public operations onto the core components
//! - Keep the wire contract small and stable: JSON in, JSON out
//!
//! # Design Decisions
//! - /change parses its body leniently; malformed JSON means "use defaults",
//!   never a 4xx
//! - /order is the only handler that can answer 500, and only when the
//!   journey itself fails

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::changes::TIMELINE_CAPACITY;
use crate::http::server::AppState;
use crate::orders::outcome::DEFAULT_REGION;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub env: String,
    pub owner: String,
    pub version: String,
    pub change_id: String,
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let identity = &state.identity;
    Json(HealthResponse {
        ok: true,
        service: identity.service.clone(),
        env: identity.env.clone(),
        owner: identity.owner.clone(),
        version: identity.version.clone(),
        change_id: identity.change_id.clone(),
    })
}

/// `GET /metrics` — Prometheus exposition text.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.prometheus.render(),
    )
}

/// `POST /change` — register a deployment change event.
pub async fn register_change(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    // Anything that is not valid JSON registers with pure defaults.
    let raw = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let event = state.changes.register(&raw);
    Json(json!({ "status": "ok", "event": event }))
}

/// `GET /changes` — most recent change events, newest first.
pub async fn list_changes(State(state): State<AppState>) -> Json<Value> {
    let changes = state.changes.recent(TIMELINE_CAPACITY);
    Json(json!({ "count": changes.len(), "changes": changes }))
}

#[derive(Deserialize)]
pub struct OrderParams {
    pub region: Option<String>,
}

/// `GET /order?region=<string>` — run one simulated order.
pub async fn place_order(
    State(state): State<AppState>,
    Query(params): Query<OrderParams>,
) -> Response {
    let region = params
        .region
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    match state.journey.handle_order(&region).await {
        Ok(receipt) => {
            Json(json!({ "ok": true, "region": receipt.region })).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}
