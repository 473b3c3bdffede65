// Names of the external dependencies guarded by the resilience shell.
pub const GRAPH_API: &str = "graph-api";
pub const VECTOR_API: &str = "vector-api";
pub const SIMILARITY_API: &str = "similarity-api";
pub const DATABASE: &str = "database";

/// Every dependency that gets a breaker at startup.
pub const KNOWN_DEPENDENCIES: [&str; 4] = [GRAPH_API, VECTOR_API, SIMILARITY_API, DATABASE];

/// Upper bound for any result-count limit accepted from a caller.
pub const MAX_QUERY_LIMIT: usize = 500;

/// Column names declared for statement-shaped graph queries.
pub const STATEMENT_COLUMNS: [&str; 3] = ["subject", "predicate", "object"];

/// Cache tool names, one per backend.
pub const TOOL_GRAPH: &str = "graph";
pub const TOOL_VECTOR: &str = "vector";
pub const TOOL_SIMILARITY: &str = "similarity";
pub const TOOL_HYBRID: &str = "hybrid";
