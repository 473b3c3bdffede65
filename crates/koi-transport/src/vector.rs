use koi_core::config::BackendConfig;
use koi_core::constants::VECTOR_API;
use koi_core::models::{VectorHealth, VectorMemory, VectorQuery, VectorStats};
use koi_core::traits::IVectorBackend;
use koi_core::KoiResult;
use reqwest::Client;

use crate::client::{self, HttpClientConfig};
use crate::protocol::SearchResponse;

/// Vector/keyword search API. `POST {base}/query`, `GET {base}/health`
/// and `GET {base}/stats`.
#[derive(Debug, Clone)]
pub struct HttpVectorClient {
    client: Client,
    query_url: String,
    health_url: String,
    stats_url: String,
}

impl HttpVectorClient {
    pub fn new(backends: &BackendConfig) -> KoiResult<Self> {
        let client =
            client::build_client(&HttpClientConfig::for_dependency(backends, VECTOR_API))?;
        Ok(Self::with_client(client, &backends.vector_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            query_url: client::join(base_url, "query"),
            health_url: client::join(base_url, "health"),
            stats_url: client::join(base_url, "stats"),
        }
    }
}

impl IVectorBackend for HttpVectorClient {
    async fn search(&self, query: &VectorQuery) -> KoiResult<Vec<VectorMemory>> {
        let response: SearchResponse =
            client::post_json(&self.client, VECTOR_API, &self.query_url, query).await?;
        let memories = response.into_memories(VECTOR_API)?;
        tracing::debug!(query = %query.query, returned = memories.len(), "vector search");
        Ok(memories)
    }

    async fn health(&self) -> KoiResult<VectorHealth> {
        client::get_json(&self.client, VECTOR_API, &self.health_url).await
    }

    async fn stats(&self) -> KoiResult<VectorStats> {
        client::get_json(&self.client, VECTOR_API, &self.stats_url).await
    }
}
