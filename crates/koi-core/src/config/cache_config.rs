use serde::{Deserialize, Serialize};

use super::defaults;

/// Result cache configuration. The volatile category is never cached and
/// has no settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to turn every lookup into a miss.
    pub enabled: bool,
    pub static_ttl_secs: u64,
    pub static_capacity: u64,
    pub semi_static_ttl_secs: u64,
    pub semi_static_capacity: u64,
    pub dynamic_ttl_secs: u64,
    pub dynamic_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_CACHE_ENABLED,
            static_ttl_secs: defaults::STATIC_TTL_SECS,
            static_capacity: defaults::STATIC_CAPACITY,
            semi_static_ttl_secs: defaults::SEMI_STATIC_TTL_SECS,
            semi_static_capacity: defaults::SEMI_STATIC_CAPACITY,
            dynamic_ttl_secs: defaults::DYNAMIC_TTL_SECS,
            dynamic_capacity: defaults::DYNAMIC_CAPACITY,
        }
    }
}
