use std::future::Future;
use std::sync::Arc;

use crate::errors::KoiResult;
use crate::models::{GraphRequest, GraphRow};

/// Knowledge-graph store that executes generated queries.
pub trait IGraphBackend: Send + Sync {
    /// Run one query and return its rows keyed by `request.columns`.
    fn run(&self, request: &GraphRequest)
        -> impl Future<Output = KoiResult<Vec<GraphRow>>> + Send;
}

impl<T: IGraphBackend + ?Sized> IGraphBackend for Arc<T> {
    fn run(
        &self,
        request: &GraphRequest,
    ) -> impl Future<Output = KoiResult<Vec<GraphRow>>> + Send {
        (**self).run(request)
    }
}
