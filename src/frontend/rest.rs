//! REST frontend: `GET/POST /v1/<api>/<method>?k=v&…`. Grounded on
//! `examples/original_source/cmd/hiveInterpreter/rpc.go`'s `doHandleREST`.

use crate::dispatch;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::json_util::flatten;
use crate::normalize::NormalizedRequest;
use crate::registries::{AB_LITE, HIVE_CALLS};
use crate::router::Role;
use crate::virtual_endpoints;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::form_urlencoded;

struct RestRoute {
    role: Role,
    api_call: String,
}

fn rest_route(api_call: &str, api_method: &str, gateway: &Gateway) -> RestRoute {
    let mut role = Role::Full;
    let mut api_call = api_call.to_string();

    if gateway.config.hive_enabled() && (api_call == "hive" || api_call == "bridge") {
        role = Role::Hive;
    }
    if gateway.config.hive_enabled() && HIVE_CALLS.contains(api_method) {
        role = Role::Hive;
        api_call = "condenser_api".to_string();
    }
    if AB_LITE.contains(api_call.as_str()) {
        role = Role::Lite;
    }

    RestRoute { role, api_call }
}

/// Unwraps the JSON-RPC envelope into a bare REST reply. A non-null mapping
/// `result` becomes the reply as-is; a non-null non-mapping `result` keeps
/// the envelope minus `id`/`jsonrpc`; a null `result` with an `error`
/// present surfaces the error as the reply.
fn shape_reply(envelope: Value) -> Value {
    match envelope.get("result").cloned() {
        Some(r) if r.is_object() => r,
        Some(r) if !r.is_null() => {
            let mut obj = envelope.as_object().cloned().unwrap_or_default();
            obj.remove("id");
            obj.remove("jsonrpc");
            Value::Object(obj)
        }
        _ => envelope.get("error").cloned().unwrap_or(Value::Null),
    }
}

pub async fn handler(
    State(gateway): State<Arc<Gateway>>,
    Path((api_call, api_method)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let mut query: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(q) = uri.query() {
        for (k, v) in form_urlencoded::parse(q.as_bytes()) {
            query.entry(k.into_owned()).or_default().push(v.into_owned());
        }
    }
    let params = flatten(&query);
    let route = rest_route(&api_call, &api_method, &gateway);

    match api_method.as_str() {
        "get_block_by_time" => {
            let Some(timestamp) = params.get("timestamp").and_then(Value::as_str) else {
                return GatewayError::InvalidRestPath.into_response();
            };
            return match virtual_endpoints::get_block_by_time_reply(&gateway, route.role, timestamp).await {
                Ok(body) => (StatusCode::OK, Json(body)).into_response(),
                Err(e) => e.into_response(),
            };
        }
        "get_total_supply" | "get_circulating_supply" => {
            let kind = if api_method == "get_total_supply" { "virtual_supply" } else { "current_supply" };
            return match virtual_endpoints::get_total_supply(&gateway, route.role, kind).await {
                Ok(text) => (StatusCode::OK, text).into_response(),
                Err(e) => e.into_response(),
            };
        }
        "get_original_body" => {
            let author = params.get("author").and_then(Value::as_str);
            let permlink = params.get("permlink").and_then(Value::as_str);
            let (Some(author), Some(permlink)) = (author, permlink) else {
                return GatewayError::InvalidRestPath.into_response();
            };
            return match virtual_endpoints::get_original_body(&gateway, route.role, author, permlink).await {
                Ok(body) => (StatusCode::OK, Json(body)).into_response(),
                Err(e) => e.into_response(),
            };
        }
        _ => {}
    }

    let req = NormalizedRequest {
        method: format!("{}.{}", route.api_call, api_method),
        params,
        original_id: serde_json::json!("0"),
        array_wrapped: false,
    };

    let result = dispatch::dispatch(&gateway, &req, route.role).await;
    if result.body.is_empty() {
        let status = StatusCode::from_u16(result.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(serde_json::json!({"error": "upstream unavailable"}))).into_response();
    }

    let envelope: Value = match serde_json::from_slice(&result.body) {
        Ok(v) => v,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "invalid upstream response"})),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(shape_reply(envelope))).into_response()
}

pub async fn invalid_path() -> impl IntoResponse {
    GatewayError::InvalidRestPath.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn gateway() -> Gateway {
        Gateway::new(Config {
            debug: false,
            workers: 1,
            queue: 1,
            lite: "http://127.0.0.1:1".into(),
            full: "http://127.0.0.1:1".into(),
            hive: "http://127.0.0.1:1".into(),
            push: String::new(),
            listen: "/tmp/rest-test.sock".into(),
        })
    }

    #[test]
    fn hive_call_forces_condenser_api_call() {
        let gw = gateway();
        let r = rest_route("condenser_api", "get_discussion", &gw);
        assert_eq!(r.api_call, "condenser_api");
        assert_eq!(r.role as u8, Role::Hive as u8);
    }

    #[test]
    fn ab_lite_namespace_overrides_to_lite() {
        let gw = gateway();
        let r = rest_route("database_api", "get_dynamic_global_properties", &gw);
        assert_eq!(r.role as u8, Role::Lite as u8);
    }

    #[test]
    fn shape_reply_unwraps_mapping_result() {
        let envelope = serde_json::json!({"jsonrpc":"2.0","id":"0","result":{"a":1}});
        assert_eq!(shape_reply(envelope), serde_json::json!({"a": 1}));
    }

    #[test]
    fn shape_reply_strips_envelope_for_non_mapping_result() {
        let envelope = serde_json::json!({"jsonrpc":"2.0","id":"0","result":"plain"});
        assert_eq!(shape_reply(envelope), serde_json::json!({"result": "plain"}));
    }

    #[test]
    fn shape_reply_surfaces_error_when_result_is_null() {
        let envelope = serde_json::json!({"jsonrpc":"2.0","id":"0","result":null,"error":{"code":-1,"message":"boom"}});
        assert_eq!(shape_reply(envelope), serde_json::json!({"code":-1,"message":"boom"}));
    }
}
