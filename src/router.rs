//! Routing: selects the upstream role for a normalized request.
//! Grounded on `examples/original_source/cmd/hiveInterpreter/rpc.go`'s
//! `slp := strings.Split(method, ".")` cascade and `get_state` path regexes.

use crate::config::Config;
use crate::normalize::NormalizedRequest;
use crate::registries::{AB_HIVE, AB_LITE, CONDENSER_LITE, HIVE_CALLS};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Full,
    Lite,
    Hive,
    Push,
}

pub struct RouteDecision {
    pub role: Role,
    /// Some(method) if `get_active_votes` under an AB_HIVE namespace was
    /// rewritten to the condenser form without changing the route.
    pub rewritten_method: Option<String>,
}

static WITNESS_OR_PROPOSALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/?(~?witnesses|proposals)$").unwrap());
static TRANSFERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/@[^/]+/transfers").unwrap());

pub fn route(req: &NormalizedRequest, cfg: &Config) -> RouteDecision {
    let api = req.api();
    let call = req.call();
    let mut role = Role::Full;
    let mut rewritten_method = None;

    if AB_LITE.contains(api) {
        role = Role::Lite;
    }
    if cfg.push_enabled() && api == "network_broadcast_api" {
        role = Role::Push;
    }
    if api == "condenser_api" && CONDENSER_LITE.contains(call) {
        role = Role::Lite;
    }

    if cfg.hive_enabled() {
        if api == "hive" || api == "bridge" {
            role = Role::Hive;
        }
        if AB_HIVE.contains(api) {
            if call == "get_active_votes" {
                rewritten_method = Some("condenser_api.get_active_votes".to_string());
            } else {
                role = Role::Hive;
            }
        }
        if HIVE_CALLS.contains(call) {
            role = Role::Hive;
        }
    }

    if cfg.push_enabled()
        && api == "condenser_api"
        && (call == "broadcast_transaction" || call == "broadcast_transaction_synchronous")
    {
        role = Role::Push;
    }

    if cfg.hive_enabled() && call == "get_state" {
        if let Some(p) = first_string_param(req.call_args()) {
            if WITNESS_OR_PROPOSALS.is_match(p) {
                role = Role::Lite;
            } else if TRANSFERS.is_match(p) {
                role = Role::Full;
            }
        }
    }

    RouteDecision { role, rewritten_method }
}

fn first_string_param(params: &Value) -> Option<&str> {
    match params {
        Value::Array(arr) => arr.first().and_then(Value::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedRequest;
    use serde_json::json;

    fn cfg() -> Config {
        Config {
            debug: false,
            workers: 4,
            queue: 2,
            lite: "http://127.0.0.1:8080".into(),
            full: "http://127.0.0.1:8090".into(),
            hive: "http://127.0.0.1:8091".into(),
            push: String::new(),
            listen: "/tmp/test.sock".into(),
        }
    }

    fn req(method: &str, params: Value) -> NormalizedRequest {
        NormalizedRequest {
            method: method.to_string(),
            params,
            original_id: json!("0"),
            array_wrapped: false,
        }
    }

    #[test]
    fn default_route_is_full() {
        let d = route(&req("custom_api.get_thing", json!([])), &cfg());
        assert_eq!(d.role, Role::Full);
    }

    #[test]
    fn ab_lite_namespace_routes_lite() {
        let d = route(&req("database_api.get_dynamic_global_properties", json!({})), &cfg());
        assert_eq!(d.role, Role::Lite);
    }

    #[test]
    fn condenser_lite_call_routes_lite() {
        let d = route(&req("condenser_api.get_accounts", json!([["alice"]])), &cfg());
        assert_eq!(d.role, Role::Lite);
    }

    #[test]
    fn network_broadcast_routes_push() {
        let d = route(&req("network_broadcast_api.broadcast_transaction", json!({})), &cfg());
        assert_eq!(d.role, Role::Push);
    }

    #[test]
    fn condenser_broadcast_routes_push() {
        let d = route(&req("condenser_api.broadcast_transaction_synchronous", json!([{}])), &cfg());
        assert_eq!(d.role, Role::Push);
    }

    #[test]
    fn ab_hive_namespace_routes_hive() {
        let d = route(&req("follow_api.get_followers", json!({})), &cfg());
        assert_eq!(d.role, Role::Hive);
    }

    #[test]
    fn ab_hive_get_active_votes_rewrites_without_override() {
        let d = route(&req("follow_api.get_active_votes", json!({})), &cfg());
        assert_eq!(d.rewritten_method.as_deref(), Some("condenser_api.get_active_votes"));
    }

    #[test]
    fn hive_call_routes_hive() {
        let d = route(&req("condenser_api.get_discussion", json!(["alice", "post"])), &cfg());
        assert_eq!(d.role, Role::Hive);
    }

    #[test]
    fn get_state_witnesses_path_routes_lite() {
        let d = route(&req("condenser_api.get_state", json!(["/witnesses"])), &cfg());
        assert_eq!(d.role, Role::Lite);
    }

    #[test]
    fn get_state_transfers_path_routes_full() {
        let d = route(&req("condenser_api.get_state", json!(["/@alice/transfers"])), &cfg());
        assert_eq!(d.role, Role::Full);
    }

    #[test]
    fn get_state_other_path_keeps_hive_route() {
        let d = route(&req("condenser_api.get_state", json!(["/trending"])), &cfg());
        assert_eq!(d.role, Role::Hive);
    }

    #[test]
    fn hive_disabled_never_routes_hive() {
        let mut c = cfg();
        c.hive = String::new();
        let d = route(&req("follow_api.get_followers", json!({})), &c);
        assert_eq!(d.role, Role::Full);
    }

    #[test]
    fn get_state_path_discrimination_is_skipped_when_hive_disabled() {
        let mut c = cfg();
        c.hive = String::new();
        let d = route(&req("condenser_api.get_state", json!(["/witnesses"])), &c);
        assert_eq!(d.role, Role::Full);
    }

    #[test]
    fn get_state_path_discrimination_reads_preserved_call_args() {
        // A condenser array `call` envelope that stayed `method == "call"`
        // (everything but get_transaction) still carries its args in
        // params[2], not params directly.
        let call_req = req("call", json!(["condenser_api", "get_state", ["/witnesses"]]));
        let d = route(&call_req, &cfg());
        assert_eq!(d.role, Role::Lite);
    }
}
