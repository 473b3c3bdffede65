//! Category-keyed result cache backed by moka.
//!
//! `get`/`set` never fail: anything that goes wrong inside the cache layer
//! (disabled cache, volatile query type, value that no longer deserializes)
//! is a miss.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use koi_core::config::CacheConfig;
use koi_core::models::CacheStats;
use koi_core::KoiResult;
use koi_observability::events;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::category::{CacheCategory, QueryType};
use crate::key::cache_key;

/// An immutable cached value.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub category: CacheCategory,
    pub value: Value,
    pub inserted_at: DateTime<Utc>,
}

/// One moka cache per cached category. Expired entries are dropped on read.
pub struct ResultCache {
    enabled: bool,
    static_tier: Cache<String, Arc<CacheEntry>>,
    semi_static_tier: Cache<String, Arc<CacheEntry>>,
    dynamic_tier: Cache<String, Arc<CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

impl ResultCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            enabled: config.enabled,
            static_tier: build_tier(CacheCategory::Static, config),
            semi_static_tier: build_tier(CacheCategory::SemiStatic, config),
            dynamic_tier: build_tier(CacheCategory::Dynamic, config),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn get(&self, tool: &str, query_type: QueryType, params: &Value) -> Option<Value> {
        self.get_entry(tool, query_type, params)
            .map(|entry| entry.value.clone())
    }

    pub fn get_entry(
        &self,
        tool: &str,
        query_type: QueryType,
        params: &Value,
    ) -> Option<Arc<CacheEntry>> {
        let tier = self.tier(query_type.category())?;
        let found = tier.get(&cache_key(tool, query_type, params));
        self.record_lookup(query_type, found.is_some());
        found
    }

    pub fn set(&self, tool: &str, query_type: QueryType, params: &Value, value: Value) {
        let category = query_type.category();
        let Some(tier) = self.tier(category) else {
            return;
        };
        let key = cache_key(tool, query_type, params);
        let entry = Arc::new(CacheEntry {
            key: key.clone(),
            category,
            value,
            inserted_at: Utc::now(),
        });
        tier.insert(key, entry);
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Typed lookup. A stored value that no longer deserializes as `T` is a miss.
    pub fn get_typed<T: DeserializeOwned>(
        &self,
        tool: &str,
        query_type: QueryType,
        params: &Value,
    ) -> Option<T> {
        let entry = self.get_entry(tool, query_type, params)?;
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key = %entry.key, error = %e, "cached value did not deserialize");
                None
            }
        }
    }

    /// Typed store. Values that fail to serialize are not cached.
    pub fn set_typed<T: Serialize>(
        &self,
        tool: &str,
        query_type: QueryType,
        params: &Value,
        value: &T,
    ) {
        if self.tier(query_type.category()).is_none() {
            return;
        }
        match serde_json::to_value(value) {
            Ok(value) => self.set(tool, query_type, params, value),
            Err(e) => tracing::debug!(error = %e, "result not cacheable"),
        }
    }

    /// Return the cached value, or run `fut` and cache it if it succeeds.
    /// Errors are returned as-is and never cached.
    pub async fn get_or_try_insert<T, Fut>(
        &self,
        tool: &str,
        query_type: QueryType,
        params: &Value,
        fut: Fut,
    ) -> KoiResult<T>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = KoiResult<T>>,
    {
        if let Some(cached) = self.get_typed(tool, query_type, params) {
            return Ok(cached);
        }
        let value = fut.await?;
        self.set_typed(tool, query_type, params, &value);
        Ok(value)
    }

    pub fn invalidate_all(&self) {
        for category in CacheCategory::CACHED {
            if let Some(tier) = self.raw_tier(category) {
                tier.invalidate_all();
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = CacheCategory::CACHED
            .iter()
            .filter_map(|c| self.raw_tier(*c))
            .map(|tier| {
                tier.run_pending_tasks();
                tier.entry_count()
            })
            .sum();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            entries,
        }
    }

    fn tier(&self, category: CacheCategory) -> Option<&Cache<String, Arc<CacheEntry>>> {
        if !self.enabled {
            return None;
        }
        self.raw_tier(category)
    }

    fn raw_tier(&self, category: CacheCategory) -> Option<&Cache<String, Arc<CacheEntry>>> {
        match category {
            CacheCategory::Static => Some(&self.static_tier),
            CacheCategory::SemiStatic => Some(&self.semi_static_tier),
            CacheCategory::Dynamic => Some(&self.dynamic_tier),
            CacheCategory::Volatile => None,
        }
    }

    fn record_lookup(&self, query_type: QueryType, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        events::cache_lookup(query_type.as_str(), query_type.category().as_str(), hit);
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.enabled)
            .field("stats", &self.stats())
            .finish()
    }
}

fn build_tier(category: CacheCategory, config: &CacheConfig) -> Cache<String, Arc<CacheEntry>> {
    let (ttl, capacity) = category.limits(config).unwrap_or_default();
    Cache::builder()
        .max_capacity(capacity)
        .time_to_live(ttl)
        .eviction_policy(EvictionPolicy::lru())
        .build()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use koi_core::errors::{BackendError, TransientCause};
    use serde_json::json;

    use super::*;

    #[test]
    fn round_trip_for_cached_categories() {
        let cache = ResultCache::default();
        let params = json!({"query": "MsgSend", "limit": 10});
        for qt in QueryType::ALL {
            cache.set("graph", qt, &params, json!([qt.as_str()]));
            let got = cache.get("graph", qt, &params);
            if qt.category() == CacheCategory::Volatile {
                assert_eq!(got, None, "{qt} must never hit");
            } else {
                assert_eq!(got, Some(json!([qt.as_str()])), "{qt}");
            }
        }
    }

    #[test]
    fn disabled_cache_always_misses() {
        let cache = ResultCache::disabled();
        let params = json!({"q": 1});
        cache.set("graph", QueryType::GraphBroad, &params, json!(1));
        assert_eq!(cache.get("graph", QueryType::GraphBroad, &params), None);
        assert_eq!(cache.stats().inserts, 0);
    }

    #[test]
    fn typed_mismatch_is_a_miss() {
        let cache = ResultCache::default();
        let params = json!({"q": 1});
        cache.set("vector", QueryType::VectorSearch, &params, json!("not a number"));
        assert_eq!(
            cache.get_typed::<u32>("vector", QueryType::VectorSearch, &params),
            None
        );
        cache.set_typed("vector", QueryType::VectorSearch, &params, &42u32);
        assert_eq!(
            cache.get_typed::<u32>("vector", QueryType::VectorSearch, &params),
            Some(42)
        );
    }

    #[test]
    fn stats_count_hits_misses_inserts() {
        let cache = ResultCache::default();
        let params = json!({"q": "x"});
        assert!(cache.get("graph", QueryType::GraphFocused, &params).is_none());
        cache.set("graph", QueryType::GraphFocused, &params, json!([]));
        assert!(cache.get("graph", QueryType::GraphFocused, &params).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.entries, 1);

        cache.invalidate_all();
        assert!(cache.get("graph", QueryType::GraphFocused, &params).is_none());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = ResultCache::new(&CacheConfig {
            dynamic_ttl_secs: 1,
            ..CacheConfig::default()
        });
        let params = json!({"q": "ttl"});
        cache.set("vector", QueryType::VectorSearch, &params, json!(1));
        assert!(cache.get("vector", QueryType::VectorSearch, &params).is_some());
        std::thread::sleep(Duration::from_millis(1_200));
        assert!(cache.get("vector", QueryType::VectorSearch, &params).is_none());
    }

    #[tokio::test]
    async fn get_or_try_insert_caches_only_success() {
        let cache = ResultCache::default();
        let params = json!({"q": "z"});

        let failed: KoiResult<Vec<String>> = cache
            .get_or_try_insert("graph", QueryType::GraphBroad, &params, async {
                Err(BackendError::Transient {
                    dependency: "graph-api".into(),
                    cause: TransientCause::Timeout,
                    detail: "slow".into(),
                }
                .into())
            })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.stats().inserts, 0);

        let first = cache
            .get_or_try_insert("graph", QueryType::GraphBroad, &params, async {
                Ok(vec!["a".to_string()])
            })
            .await
            .unwrap();
        let second: Vec<String> = cache
            .get_or_try_insert("graph", QueryType::GraphBroad, &params, async {
                Ok(vec!["b".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
