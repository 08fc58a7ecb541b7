//! Gateway: the single owning context (four upstream pools, the response
//! cache, config), threaded through handlers via axum's `State` extractor.
//! Supersedes the original's package-level mutable globals (`ep2pool`,
//! `respcache`) per SPEC_FULL.md §9. Grounded on the teacher's `AppState`
//! dependency-injection pattern in `handler/mod.rs`, generalized from one
//! upstream to four role-keyed pools.

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::registries::DEFAULT_CACHE_TTL_SECS;
use crate::router::Role;
use crate::upstream::client::UpstreamClient;
use crate::upstream::pool::WorkerPool;
use std::sync::Arc;

pub struct Gateway {
    pub config: Config,
    full: Arc<WorkerPool>,
    lite: Arc<WorkerPool>,
    hive: Option<Arc<WorkerPool>>,
    push: Arc<WorkerPool>,
    pub cache: ResponseCache,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        let full = Arc::new(WorkerPool::new(
            Arc::new(UpstreamClient::new(&config.full)),
            config.workers,
            config.queue,
        ));
        let lite = Arc::new(WorkerPool::new(
            Arc::new(UpstreamClient::new(&config.lite)),
            config.workers,
            config.queue,
        ));
        let hive = if config.hive_enabled() {
            Some(Arc::new(WorkerPool::new(
                Arc::new(UpstreamClient::new(&config.hive)),
                config.workers,
                config.queue,
            )))
        } else {
            None
        };
        // The push pool is always distinct, even when its target URL
        // coincides with the lite target.
        let push = Arc::new(WorkerPool::new(
            Arc::new(UpstreamClient::new(config.push_target())),
            config.workers,
            config.queue,
        ));
        let cache = ResponseCache::new(10_000, DEFAULT_CACHE_TTL_SECS);

        Self { config, full, lite, hive, push, cache }
    }

    pub fn pool(&self, role: Role) -> Option<&Arc<WorkerPool>> {
        match role {
            Role::Full => Some(&self.full),
            Role::Lite => Some(&self.lite),
            Role::Hive => self.hive.as_ref(),
            Role::Push => Some(&self.push),
        }
    }

    /// Queue occupancy per role, for the `/status` diagnostics endpoint.
    pub fn pool_status(&self) -> serde_json::Value {
        let describe = |p: &WorkerPool| {
            serde_json::json!({ "occupancy": p.occupancy(), "capacity": p.capacity() })
        };
        serde_json::json!({
            "full": describe(&self.full),
            "lite": describe(&self.lite),
            "hive": self.hive.as_ref().map(|p| describe(p)),
            "push": describe(&self.push),
        })
    }
}
