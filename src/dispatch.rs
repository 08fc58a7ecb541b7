//! Dispatcher: serializes the canonical request, consults the cache,
//! submits to the routed pool, and stores the result. Grounded on
//! `examples/original_source/cmd/hiveInterpreter/network.go`'s
//! `requestToResponse` plus `main.go`'s deterministic-encoder configuration.

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::json_util::canonical_bytes;
use crate::normalize::NormalizedRequest;
use crate::router::Role;

pub struct DispatchResult {
    pub status: u16,
    pub body: Vec<u8>,
    pub cached: bool,
}

pub async fn dispatch(gateway: &Gateway, req: &NormalizedRequest, role: Role) -> DispatchResult {
    let canonical = req.canonical_value();
    let key_bytes = canonical_bytes(&canonical);
    let key = String::from_utf8_lossy(&key_bytes).into_owned();

    if let Some(cached) = gateway.cache.get(&key).await {
        return DispatchResult { status: 200, body: cached, cached: true };
    }

    let Some(pool) = gateway.pool(role) else {
        return DispatchResult { status: 500, body: Vec::new(), cached: false };
    };

    match pool.submit(key_bytes).await {
        Ok((status, body)) => {
            if body.is_empty() {
                return DispatchResult { status: 500, body: Vec::new(), cached: false };
            }
            let ttl = gateway.cache.ttl_for(req.call());
            gateway.cache.insert(key, body.clone(), ttl).await;
            DispatchResult { status, body, cached: false }
        }
        Err(GatewayError::PoolSaturated) => {
            DispatchResult { status: 504, body: Vec::new(), cached: false }
        }
        Err(_) => DispatchResult { status: 500, body: Vec::new(), cached: false },
    }
}
