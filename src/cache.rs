//! ResponseCache: TTL-per-entry response cache keyed by canonical request
//! bytes. Grounded on the teacher's `cache/store.rs` (`RpcCache`,
//! `PerEntryExpiry`) and `cache/policy.rs` (table-driven TTL override),
//! generalized to the per-method TTL table in SPEC_FULL.md §3/§6.

use crate::registries::{CACHE_TTL_SECS, DEFAULT_CACHE_TTL_SECS};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    value: Vec<u8>,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct ResponseCache {
    cache: Cache<String, Entry>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(max_size: u64, default_ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_size)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache, default_ttl: Duration::from_secs(default_ttl_secs) }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// The TTL for a given `call` name: the per-method override if one
    /// exists, else the cache's configured default.
    pub fn ttl_for(&self, call: &str) -> Duration {
        match CACHE_TTL_SECS.get(call) {
            Some(secs) => Duration::from_secs(*secs),
            None => self.default_ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).await.map(|e| e.value)
    }

    pub async fn insert(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.cache.insert(key, Entry { value, ttl }).await;
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(10_000, DEFAULT_CACHE_TTL_SECS)
    }
}
