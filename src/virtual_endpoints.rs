//! Virtual endpoints requiring multi-round upstream searches. Grounded
//! line-for-line on `examples/original_source/cmd/hiveInterpreter/extensions.go`.

use crate::diff::encode_delta;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::json_util::canonical_bytes;
use crate::router::Role;
use chrono::NaiveDateTime;
use serde_json::{json, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const GENESIS_TIMESTAMP: &str = "2016-03-24T16:05:00";
const SECONDS_PER_BLOCK: i64 = 3;

/// Submits `method`/`params` directly to the routed pool, bypassing the
/// response cache (virtual endpoints compose several such calls and cache
/// only their final, synthesized reply).
async fn call_upstream(gateway: &Gateway, role: Role, method: &str, params: Value) -> Result<Value, GatewayError> {
    let pool = gateway
        .pool(role)
        .ok_or_else(|| GatewayError::UpstreamUnavailable(format!("{role:?} upstream not configured")))?;
    let envelope = json!({"jsonrpc": "2.0", "id": "0", "method": method, "params": params});
    let bytes = canonical_bytes(&envelope);
    let (_status, body) = pool.submit(bytes).await?;
    if body.is_empty() {
        return Err(GatewayError::UpstreamUnavailable("empty upstream response".into()));
    }
    serde_json::from_slice(&body).map_err(GatewayError::from)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, GatewayError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| GatewayError::MalformedEnvelope(format!("bad timestamp {s:?}: {e}")))
}

/// Resolves the block number observed at or just before `timestamp`.
/// See SPEC_FULL.md §4.8 and DESIGN.md for the oscillation-detection and
/// refinement-exhaustion open questions this preserves.
pub async fn get_block_by_time(gateway: &Gateway, role: Role, timestamp: &str) -> Result<i64, GatewayError> {
    let genesis = NaiveDateTime::parse_from_str(GENESIS_TIMESTAMP, TIMESTAMP_FORMAT)
        .expect("genesis constant is a valid timestamp");
    let requested = parse_timestamp(timestamp)?;

    let delta_seconds = (requested - genesis).num_seconds();
    let mut bguess = delta_seconds / SECONDS_PER_BLOCK;
    let mut btarget: i64 = if delta_seconds < 0 { 1 } else { 0 };
    if bguess == 0 {
        bguess = 1;
    }

    let props = call_upstream(gateway, role, "database_api.get_dynamic_global_properties", json!({})).await?;
    let head_time_str = props
        .pointer("/result/time")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::UpstreamUnavailable("missing dynamic global properties time".into()))?;
    let head_time = parse_timestamp(head_time_str)?;

    if requested > head_time {
        btarget = props
            .pointer("/result/head_block_number")
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .ok_or_else(|| GatewayError::UpstreamUnavailable("missing head_block_number".into()))?;
    }

    if btarget == 0 {
        let mut bdelta_prev: i64 = 0;
        let mut bconst: i64 = 1 << 23;
        loop {
            let header_resp =
                call_upstream(gateway, role, "block_api.get_block_header", json!({"block_num": bguess})).await?;
            let header = header_resp.pointer("/result/header").filter(|h| !h.is_null());

            let Some(header) = header else {
                bguess -= bconst;
                bconst /= 2;
                if bconst == 0 {
                    tracing::warn!(
                        timestamp = %timestamp,
                        "get_block_by_time refinement exhausted before converging, defaulting to block 1"
                    );
                    btarget = 1;
                    break;
                }
                continue;
            };

            let header_ts = header
                .get("timestamp")
                .and_then(Value::as_str)
                .ok_or_else(|| GatewayError::UpstreamUnavailable("missing block header timestamp".into()))?;
            let header_time = parse_timestamp(header_ts)?;
            let bdelta = (header_time - requested).num_seconds() / SECONDS_PER_BLOCK;

            if bdelta == 0 {
                btarget = bguess;
                break;
            }
            bguess -= bdelta;
            if bdelta_prev == -bdelta {
                btarget = bguess;
                break;
            }
            bdelta_prev = bdelta;
        }
    }

    Ok(btarget)
}

/// Fetches `block_api.get_block` for `get_block_by_time`'s resolved block
/// number and injects the discovered number into `result.block.block`.
pub async fn get_block_by_time_reply(gateway: &Gateway, role: Role, timestamp: &str) -> Result<Value, GatewayError> {
    let btarget = get_block_by_time(gateway, role, timestamp).await?;
    let mut reply = call_upstream(gateway, role, "block_api.get_block", json!({"block_num": btarget})).await?;
    if let Some(block) = reply.pointer_mut("/result/block") {
        if let Some(obj) = block.as_object_mut() {
            obj.insert("block".to_string(), json!(btarget));
        }
    }
    Ok(reply)
}

/// `get_total_supply`/`get_circulating_supply`: `kind` is
/// `"virtual_supply"` or `"current_supply"`.
pub async fn get_total_supply(gateway: &Gateway, role: Role, kind: &str) -> Result<String, GatewayError> {
    let resp = call_upstream(gateway, role, "database_api.get_dynamic_global_properties", json!({})).await?;
    let amount = resp
        .pointer(&format!("/result/{kind}/amount"))
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::UpstreamUnavailable(format!("missing {kind} amount")))?;
    Ok(format_amount(amount))
}

/// Inserts a decimal point three digits from the right of an integer
/// amount string, e.g. `"458123456789"` -> `"458123456.789"`.
fn format_amount(amount: &str) -> String {
    let split_at = amount.len().saturating_sub(3);
    format!("{}.{}", &amount[..split_at], &amount[split_at..])
}

/// Recovers a post's original body even after edits, diffing it against
/// the current body.
pub async fn get_original_body(gateway: &Gateway, role: Role, author: &str, permlink: &str) -> Result<Value, GatewayError> {
    let resp = call_upstream(gateway, role, "condenser_api.get_content", json!([author, permlink])).await?;
    let result = resp.get("result").cloned().unwrap_or(Value::Null);

    let Some(last_update) = result.get("last_update").and_then(Value::as_str) else {
        return Ok(resp);
    };
    let created = result
        .get("created")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::UpstreamUnavailable("missing created timestamp".into()))?
        .to_string();
    let current_body = result.get("body").and_then(Value::as_str).unwrap_or_default().to_string();

    if created == last_update {
        return Ok(json!({"body": current_body, "edited": false}));
    }

    let btarget = get_block_by_time(gateway, role, &created).await?;
    let block_resp =
        call_upstream(gateway, role, "block_api.get_block", json!({"block_num": btarget + 1})).await?;
    let transactions = block_resp
        .pointer("/result/block/transactions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for trx in &transactions {
        let Some(ops) = trx.get("operations").and_then(Value::as_array) else {
            continue;
        };
        for op in ops {
            if op.get("type").and_then(Value::as_str) != Some("comment_operation") {
                continue;
            }
            let Some(value) = op.get("value") else { continue };
            if value.get("author").and_then(Value::as_str) == Some(author)
                && value.get("permlink").and_then(Value::as_str) == Some(permlink)
            {
                let original_body = value.get("body").and_then(Value::as_str).unwrap_or_default();
                let delta = encode_delta(original_body, &current_body);
                return Ok(json!({
                    "body": original_body,
                    "edited": true,
                    "diff_to_latest": delta,
                }));
            }
        }
    }

    Ok(json!({"error": "not found"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_amount_inserts_decimal_three_from_right() {
        assert_eq!(format_amount("458123456789"), "458123456.789");
    }

    #[test]
    fn format_amount_handles_small_values() {
        assert_eq!(format_amount("123"), ".123");
    }
}
