pub mod backend_config;
pub mod cache_config;
pub mod defaults;
pub mod koi_config;
pub mod observability_config;
pub mod resilience_config;
pub mod retrieval_config;
pub mod tables_config;

pub use backend_config::BackendConfig;
pub use cache_config::CacheConfig;
pub use koi_config::KoiConfig;
pub use observability_config::ObservabilityConfig;
pub use resilience_config::{BreakerConfig, ResilienceConfig, RetryConfig};
pub use retrieval_config::RetrievalConfig;
pub use tables_config::TablesConfig;
