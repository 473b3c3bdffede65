//! Adaptive top-K growth against historical usage coverage.

use crate::tables::ConsolidationMap;

use super::SelectionParams;

/// Share of total canonical usage held by `selected`. An empty or unused
/// vocabulary is fully covered.
pub fn coverage(selected: &[String], consolidation: &ConsolidationMap) -> f64 {
    let total = consolidation.total_usage();
    if total == 0 {
        return 1.0;
    }
    let covered: u64 = selected.iter().map(|p| consolidation.usage(p)).sum();
    covered as f64 / total as f64
}

/// Grow K from `base_k` by `step` until the target coverage is met, `max_k`
/// is reached, or the candidates run out. Returns `(k, coverage)`.
pub fn grow(candidates: &[String], consolidation: &ConsolidationMap, params: &SelectionParams) -> (usize, f64) {
    let max_k = params.max_k.max(1);
    let step = params.step.max(1);
    let mut k = params.base_k.clamp(1, max_k).min(candidates.len());
    let mut covered = coverage(&candidates[..k], consolidation);

    while covered < params.coverage_target && k < max_k && k < candidates.len() {
        k = (k + step).min(max_k).min(candidates.len());
        covered = coverage(&candidates[..k], consolidation);
    }
    (k, covered)
}
