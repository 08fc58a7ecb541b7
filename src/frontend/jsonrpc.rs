//! JSON-RPC frontend: `POST /`. Grounded on
//! `examples/original_source/cmd/hiveInterpreter/rpc.go`'s `handleRPC`.

use crate::dispatch;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::normalize::{self, NormalizeOutcome, BANNER};
use crate::router::route;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

const LONG_REQUEST_THRESHOLD_SECS: u64 = 5;

pub async fn handler(State(gateway): State<Arc<Gateway>>, body: Bytes) -> impl IntoResponse {
    let outcome = match normalize::normalize(&body) {
        Ok(o) => o,
        Err(e) => return e.into_response(),
    };

    let req = match outcome {
        NormalizeOutcome::Banner => {
            let banner: Value = serde_json::from_str(BANNER).expect("banner is valid JSON");
            return (StatusCode::OK, Json(banner)).into_response();
        }
        NormalizeOutcome::Request(r) => r,
    };

    let decision = route(&req, &gateway.config);
    let mut req = req;
    if let Some(rewritten) = decision.rewritten_method {
        req.method = rewritten;
    }

    let start = Instant::now();
    let result = dispatch::dispatch(&gateway, &req, decision.role).await;
    let elapsed = start.elapsed();
    if elapsed.as_secs() >= LONG_REQUEST_THRESHOLD_SECS {
        tracing::warn!(
            method = %req.method,
            elapsed_ms = elapsed.as_millis() as u64,
            "LONG: request exceeded {}s",
            LONG_REQUEST_THRESHOLD_SECS
        );
    }

    if result.body.is_empty() {
        let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(serde_json::json!({"error": "upstream unavailable"}))).into_response();
    }

    let mut reply: Value = match serde_json::from_slice(&result.body) {
        Ok(v) => v,
        Err(_) => {
            return GatewayError::UpstreamUnavailable("upstream returned non-JSON body".into())
                .into_response();
        }
    };

    if let Some(code) = reply.pointer("/error/code").and_then(Value::as_i64) {
        if code == -32003 {
            tracing::warn!(method = %req.method, "upstream reported a database lock (-32003)");
        }
    }

    if req.original_id != Value::String("0".to_string()) {
        if let Some(obj) = reply.as_object_mut() {
            obj.insert("id".into(), req.original_id.clone());
        }
    }

    let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::OK);
    if req.array_wrapped {
        (status, Json(Value::Array(vec![reply]))).into_response()
    } else {
        (status, Json(reply)).into_response()
    }
}
