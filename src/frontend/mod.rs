//! HTTP-facing handlers: the JSON-RPC envelope frontend and the REST
//! convenience frontend, plus the `/status` diagnostics endpoint.

pub mod jsonrpc;
pub mod rest;

use crate::gateway::Gateway;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use std::sync::Arc;

pub async fn status(State(gateway): State<Arc<Gateway>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "pools": gateway.pool_status(),
        "cache_entries": gateway.cache.entry_count().await,
    }))
}
