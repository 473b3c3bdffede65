// Single source of truth for all default values.

// --- Backends ---
pub const DEFAULT_GRAPH_URL: &str = "http://localhost:8301/api/graph/query";
pub const DEFAULT_GRAPH_NAME: &str = "regen_graph";
pub const DEFAULT_VECTOR_URL: &str = "http://localhost:8301/api/koi";
pub const DEFAULT_GRAPH_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_VECTOR_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SIMILARITY_TIMEOUT_MS: u64 = 10_000;

// --- Retry ---
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

// --- Circuit breaker ---
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_HALF_OPEN_MAX_CALLS: u32 = 3;
pub const DATABASE_FAILURE_THRESHOLD: u32 = 3;
pub const DATABASE_RESET_TIMEOUT_MS: u64 = 30_000;

// --- Cache ---
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const STATIC_TTL_SECS: u64 = 3_600; // 1 hour
pub const STATIC_CAPACITY: u64 = 100;
pub const SEMI_STATIC_TTL_SECS: u64 = 600; // 10 minutes
pub const SEMI_STATIC_CAPACITY: u64 = 200;
pub const DYNAMIC_TTL_SECS: u64 = 300; // 5 minutes
pub const DYNAMIC_CAPACITY: u64 = 500;

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_BASE_K: usize = 20;
pub const DEFAULT_COVERAGE_TARGET: f64 = 0.8;
pub const DEFAULT_MAX_K: usize = 100;
pub const DEFAULT_K_STEP: usize = 20;
pub const DEFAULT_MAX_VARIANTS_PER_CANONICAL: usize = 5;
pub const DEFAULT_COMMUNITY_TOP_N: usize = 3;
pub const DEFAULT_MAX_COMMUNITY_ADDITIONS: usize = 20;
pub const DEFAULT_RESULT_LIMIT: usize = 50;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
