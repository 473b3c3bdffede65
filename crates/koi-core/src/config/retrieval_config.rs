use serde::{Deserialize, Serialize};

use super::defaults;

/// Predicate selection and fusion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Initial number of predicates before adaptive growth.
    pub base_k: usize,
    /// Fraction of historical predicate usage the selection must cover.
    pub coverage_target: f64,
    /// Hard cap on the adaptive predicate count.
    pub max_k: usize,
    /// Growth increment while coverage is below target.
    pub k_step: usize,
    pub max_variants_per_canonical: usize,
    /// Members taken from each touched predicate community.
    pub community_top_n: usize,
    pub max_community_additions: usize,
    /// Result limit when the caller does not pass one.
    pub default_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            base_k: defaults::DEFAULT_BASE_K,
            coverage_target: defaults::DEFAULT_COVERAGE_TARGET,
            max_k: defaults::DEFAULT_MAX_K,
            k_step: defaults::DEFAULT_K_STEP,
            max_variants_per_canonical: defaults::DEFAULT_MAX_VARIANTS_PER_CANONICAL,
            community_top_n: defaults::DEFAULT_COMMUNITY_TOP_N,
            max_community_additions: defaults::DEFAULT_MAX_COMMUNITY_ADDITIONS,
            default_limit: defaults::DEFAULT_RESULT_LIMIT,
        }
    }
}
