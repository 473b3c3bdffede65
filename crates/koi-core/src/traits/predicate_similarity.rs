use std::future::Future;
use std::sync::Arc;

use crate::errors::KoiResult;
use crate::models::ScoredPredicate;

/// Embedding-similarity lookup over the predicate vocabulary.
pub trait IPredicateSimilarity: Send + Sync {
    /// Up to `top_k` predicates nearest to `query`, best first.
    fn similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> impl Future<Output = KoiResult<Vec<ScoredPredicate>>> + Send;

    /// Whether calls should be attempted at all.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl<T: IPredicateSimilarity + ?Sized> IPredicateSimilarity for Arc<T> {
    fn similar(
        &self,
        query: &str,
        top_k: usize,
    ) -> impl Future<Output = KoiResult<Vec<ScoredPredicate>>> + Send {
        (**self).similar(query, top_k)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Similarity service that is not configured. Always returns nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPredicateSimilarity;

impl IPredicateSimilarity for NoPredicateSimilarity {
    async fn similar(&self, _query: &str, _top_k: usize) -> KoiResult<Vec<ScoredPredicate>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
