use std::future::Future;
use std::sync::Arc;

use crate::errors::KoiResult;
use crate::models::{VectorHealth, VectorMemory, VectorQuery, VectorStats};

/// Semantic/keyword document search.
pub trait IVectorBackend: Send + Sync {
    fn search(
        &self,
        query: &VectorQuery,
    ) -> impl Future<Output = KoiResult<Vec<VectorMemory>>> + Send;

    fn health(&self) -> impl Future<Output = KoiResult<VectorHealth>> + Send;

    fn stats(&self) -> impl Future<Output = KoiResult<VectorStats>> + Send;
}

impl<T: IVectorBackend + ?Sized> IVectorBackend for Arc<T> {
    fn search(
        &self,
        query: &VectorQuery,
    ) -> impl Future<Output = KoiResult<Vec<VectorMemory>>> + Send {
        (**self).search(query)
    }

    fn health(&self) -> impl Future<Output = KoiResult<VectorHealth>> + Send {
        (**self).health()
    }

    fn stats(&self) -> impl Future<Output = KoiResult<VectorStats>> + Send {
        (**self).stats()
    }
}
