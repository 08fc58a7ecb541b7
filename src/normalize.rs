//! Request normalization: reshapes a raw inbound JSON-RPC envelope into
//! canonical `api.method` form. Grounded line-for-line on
//! `examples/original_source/cmd/hiveInterpreter/rpc.go`'s `doHandleReg`.

use crate::error::GatewayError;
use crate::json_util::maybe_get_int64;
use serde_json::{Map, Value};

pub const BANNER: &str = r#"{"status":"OK","jussi_num":"-1","info":"For information on how to use this api, visit https://developers.hive.io/apidefinitions/ "}"#;

/// A request after normalization: always exactly one `.` in `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub method: String,
    pub params: Value,
    /// The id the client actually sent (or `"0"` if absent).
    pub original_id: Value,
    /// Whether the inbound body was array-shaped; the reply must be
    /// re-wrapped in a single-element array if so.
    pub array_wrapped: bool,
}

impl NormalizedRequest {
    /// The API namespace. A preserved `call` envelope (condenser array form
    /// that wasn't unwrapped, e.g. everything but `get_transaction`) carries
    /// this in `params[0]` rather than in `method` itself.
    pub fn api(&self) -> &str {
        if self.method == "call" {
            return self.params.get(0).and_then(Value::as_str).unwrap_or_default();
        }
        self.method.split('.').next().unwrap_or_default()
    }

    /// The call name. See `api()` for why `call` envelopes are special-cased.
    pub fn call(&self) -> &str {
        if self.method == "call" {
            return self.params.get(1).and_then(Value::as_str).unwrap_or_default();
        }
        self.method.split('.').nth(1).unwrap_or_default()
    }

    /// The effective argument list for API-membership pattern inspection
    /// (e.g. `get_state`'s path regexes): the wrapped condenser args for a
    /// preserved `call` envelope, or `params` itself for an already-dotted
    /// method.
    pub fn call_args(&self) -> &Value {
        if self.method == "call" {
            self.params.get(2).unwrap_or(&Value::Null)
        } else {
            &self.params
        }
    }

    /// The wire form sent upstream: `jsonrpc="2.0"`, `id="0"`, canonical method/params.
    pub fn canonical_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("jsonrpc".into(), Value::String("2.0".into()));
        obj.insert("id".into(), Value::String("0".into()));
        obj.insert("method".into(), Value::String(self.method.clone()));
        obj.insert("params".into(), self.params.clone());
        Value::Object(obj)
    }
}

pub enum NormalizeOutcome {
    /// The inbound body was empty; reply with the canned usage banner.
    Banner,
    Request(NormalizedRequest),
}

pub fn normalize(body: &[u8]) -> Result<NormalizeOutcome, GatewayError> {
    if body.is_empty() {
        return Ok(NormalizeOutcome::Banner);
    }

    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| GatewayError::MalformedEnvelope(e.to_string()))?;

    let (mut obj, array_wrapped) = match raw {
        Value::Array(mut arr) => {
            if arr.len() > 1 {
                return Err(GatewayError::BatchNotSupported);
            }
            let first = arr
                .pop()
                .ok_or_else(|| GatewayError::MalformedEnvelope("empty request array".into()))?;
            match first {
                Value::Object(o) => (o, true),
                _ => return Err(GatewayError::MalformedEnvelope("array element must be an object".into())),
            }
        }
        Value::Object(o) => (o, false),
        _ => return Err(GatewayError::MalformedEnvelope("body must be an object or array".into())),
    };

    obj.entry("jsonrpc")
        .or_insert_with(|| Value::String("2.0".into()));

    let original_id = obj.get("id").cloned().unwrap_or_else(|| Value::String("0".into()));
    obj.insert("id".into(), Value::String("0".into()));

    let raw_method = obj
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::MalformedEnvelope("method must be a string".into()))?
        .to_string();

    if raw_method != "call" && !raw_method.contains('.') {
        let old_params = obj.remove("params").unwrap_or(Value::Array(Vec::new()));
        obj.insert(
            "params".into(),
            Value::Array(vec![
                Value::String("condenser_api".into()),
                Value::String(raw_method.clone()),
                old_params,
            ]),
        );
        obj.insert("method".into(), Value::String("call".into()));
    }

    let method = obj
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let (final_method, final_params) = if method == "call" {
        rewrite_call(&obj)?
    } else {
        (
            method.clone(),
            obj.get("params").cloned().unwrap_or(Value::Array(Vec::new())),
        )
    };

    if final_method != "call" && !final_method.contains('.') {
        return Err(GatewayError::MalformedEnvelope(format!(
            "normalized method {final_method:?} has no namespace separator"
        )));
    }

    enforce_size_limits(&final_method, &final_params)?;

    Ok(NormalizeOutcome::Request(NormalizedRequest {
        method: final_method,
        params: final_params,
        original_id,
        array_wrapped,
    }))
}

/// Rewrites a `method == "call"` envelope into final `(method, params)`.
fn rewrite_call(obj: &Map<String, Value>) -> Result<(String, Value), GatewayError> {
    let params = obj
        .get("params")
        .ok_or_else(|| GatewayError::MalformedEnvelope("call request missing params".into()))?;
    let mut arr = match params {
        Value::Array(a) => a.clone(),
        _ => return Err(GatewayError::MalformedEnvelope("call params must be an array".into())),
    };
    if arr.is_empty() {
        return Err(GatewayError::MalformedEnvelope("call params must not be empty".into()));
    }

    if let Some(n) = arr[0].as_i64() {
        arr[0] = match n {
            0 => Value::String("database_api".into()),
            1 => Value::String("login_api".into()),
            _ => arr[0].clone(),
        };
    }

    let api0 = arr[0]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedEnvelope("params[0] must resolve to a string".into()))?
        .to_string();
    let cond_meth = arr
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::MalformedEnvelope("params[1] must be a string".into()))?
        .to_string();

    if let Some(third) = arr.get(2) {
        if third.is_object() {
            return Ok((format!("{api0}.{cond_meth}"), third.clone()));
        }
        if let Value::Array(inner) = third {
            if cond_meth == "get_account_history" {
                check_account_history_limit(inner)?;
            }
            // get_transaction alone is unwrapped to a dotted method; every
            // other condenser array call is forwarded as-is, method still
            // "call", params[0] normalized to "condenser_api".
            if cond_meth == "get_transaction" {
                return Ok((format!("condenser_api.{cond_meth}"), Value::Array(inner.clone())));
            }
            let rewritten_params = Value::Array(vec![
                Value::String("condenser_api".into()),
                Value::String(cond_meth.clone()),
                Value::Array(inner.clone()),
            ]);
            return Ok(("call".to_string(), rewritten_params));
        }
        return Err(GatewayError::MalformedEnvelope(
            "params[2] must be an object or array".into(),
        ));
    }

    Ok((format!("{api0}.{cond_meth}"), Value::Object(Map::new())))
}

fn check_account_history_limit(inner: &[Value]) -> Result<(), GatewayError> {
    let Some(limit_val) = inner.get(2) else {
        return Err(GatewayError::MalformedEnvelope(
            "get_account_history requires a limit argument".into(),
        ));
    };
    let Some(limit) = maybe_get_int64(limit_val) else {
        return Err(GatewayError::MalformedEnvelope(
            "get_account_history limit must be numeric".into(),
        ));
    };
    if limit > 10_000 {
        return Err(GatewayError::OversizedRange(format!(
            "get_account_history limit {limit} exceeds 10000"
        )));
    }
    Ok(())
}

fn enforce_size_limits(method: &str, params: &Value) -> Result<(), GatewayError> {
    match method {
        "condenser_api.get_account_history" => {
            if let Value::Array(arr) = params {
                if let Some(limit_val) = arr.get(2) {
                    let limit = maybe_get_int64(limit_val).ok_or_else(|| {
                        GatewayError::MalformedEnvelope("get_account_history limit must be numeric".into())
                    })?;
                    if limit > 10_000 {
                        return Err(GatewayError::OversizedRange(format!(
                            "get_account_history limit {limit} exceeds 10000"
                        )));
                    }
                }
            }
        }
        "block_api.get_block_range" => {
            if let Some(count) = params.get("count") {
                let count = maybe_get_int64(count).ok_or_else(|| {
                    GatewayError::MalformedEnvelope("get_block_range count must be numeric".into())
                })?;
                if count != 1 {
                    return Err(GatewayError::OversizedRange(format!(
                        "get_block_range count {count} must equal 1"
                    )));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(body: &Value) -> NormalizedRequest {
        match normalize(body.to_string().as_bytes()).unwrap() {
            NormalizeOutcome::Request(r) => r,
            NormalizeOutcome::Banner => panic!("expected a request"),
        }
    }

    #[test]
    fn empty_body_yields_banner() {
        match normalize(b"").unwrap() {
            NormalizeOutcome::Banner => {}
            _ => panic!("expected banner"),
        }
    }

    #[test]
    fn array_with_two_elements_is_rejected() {
        let body = json!([{"method":"get_accounts"}, {"method":"get_accounts"}]);
        let err = normalize(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, GatewayError::BatchNotSupported));
    }

    #[test]
    fn legacy_method_rewritten_to_call() {
        // A bare condenser method stays wire-shaped as `"call"` with a
        // 3-element params array; only `get_transaction` gets unwrapped to a
        // dotted method (see `condenser_shaped_call_stays_call_with_three_element_params`
        // vs. `get_transaction_is_unwrapped_to_dotted_method` below).
        let body = json!({"method":"get_dynamic_global_properties","params":[]});
        let n = normalized(&body);
        assert_eq!(n.method, "call");
        assert_eq!(n.params, json!(["condenser_api", "get_dynamic_global_properties", []]));
    }

    #[test]
    fn appbase_shaped_call_uses_params_object() {
        let body = json!({
            "method":"call",
            "params":["database_api","get_dynamic_global_properties",{}]
        });
        let n = normalized(&body);
        assert_eq!(n.method, "database_api.get_dynamic_global_properties");
        assert!(n.params.is_object());
    }

    #[test]
    fn condenser_shaped_call_stays_call_with_three_element_params() {
        let body = json!({"method":"call","params":[0,"get_accounts",[["alice"]]]});
        let n = normalized(&body);
        assert_eq!(n.method, "call");
        assert_eq!(n.params, json!(["condenser_api", "get_accounts", [["alice"]]]));
        assert_eq!(n.api(), "condenser_api");
        assert_eq!(n.call(), "get_accounts");
    }

    #[test]
    fn get_transaction_is_unwrapped_to_dotted_method() {
        let body = json!({"method":"call","params":[0,"get_transaction",["1234"]]});
        let n = normalized(&body);
        assert_eq!(n.method, "condenser_api.get_transaction");
        assert_eq!(n.params, json!(["1234"]));
    }

    #[test]
    fn get_account_history_over_limit_is_rejected() {
        let body = json!({"method":"call","params":[0,"get_account_history",["alice",1000,20000]]});
        let err = normalize(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, GatewayError::OversizedRange(_)));
    }

    #[test]
    fn get_account_history_within_limit_is_accepted() {
        let body = json!({"method":"call","params":[0,"get_account_history",["alice",1000,10]]});
        let n = normalized(&body);
        assert_eq!(n.method, "call");
        assert_eq!(n.call(), "get_account_history");
    }

    #[test]
    fn block_get_block_range_requires_count_one() {
        let body = json!({
            "method":"call",
            "params":["block_api","get_block_range",{"starting_block_num":1,"count":5}]
        });
        let err = normalize(body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, GatewayError::OversizedRange(_)));
    }

    #[test]
    fn original_id_is_preserved_and_wire_id_overwritten() {
        let body = json!({"method":"get_accounts","params":[],"id":42});
        let n = normalized(&body);
        assert_eq!(n.original_id, json!(42));
        assert_eq!(n.canonical_value()["id"], json!("0"));
    }

    #[test]
    fn array_shaped_body_sets_array_wrapped() {
        let body = json!([{"method":"get_accounts","params":[]}]);
        let n = normalized(&body);
        assert!(n.array_wrapped);
    }
}
