use koi_core::config::BackendConfig;
use koi_core::constants::SIMILARITY_API;
use koi_core::models::ScoredPredicate;
use koi_core::traits::IPredicateSimilarity;
use koi_core::KoiResult;
use reqwest::Client;

use crate::client::{self, HttpClientConfig};
use crate::protocol::{SimilarRequest, SimilarResponse};

/// Predicate embedding service: `POST {base}/similar` with `{query, top_k}`.
#[derive(Debug, Clone)]
pub struct HttpSimilarityClient {
    client: Client,
    url: String,
}

impl HttpSimilarityClient {
    /// `None` when no similarity URL is configured.
    pub fn new(backends: &BackendConfig) -> KoiResult<Option<Self>> {
        let Some(base) = backends.similarity_url.as_deref() else {
            return Ok(None);
        };
        let client =
            client::build_client(&HttpClientConfig::for_dependency(backends, SIMILARITY_API))?;
        Ok(Some(Self::with_client(client, base)))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            url: client::join(base_url, "similar"),
        }
    }
}

impl IPredicateSimilarity for HttpSimilarityClient {
    async fn similar(&self, query: &str, top_k: usize) -> KoiResult<Vec<ScoredPredicate>> {
        let body = SimilarRequest { query, top_k };
        let response: SimilarResponse =
            client::post_json(&self.client, SIMILARITY_API, &self.url, &body).await?;
        let mut predicates = response.into_predicates();
        predicates.truncate(top_k);
        Ok(predicates)
    }
}

/// The similarity service as configured: present, or switched off.
#[derive(Debug, Clone, Default)]
pub enum ConfiguredSimilarity {
    Http(HttpSimilarityClient),
    #[default]
    Disabled,
}

impl ConfiguredSimilarity {
    pub fn from_config(backends: &BackendConfig) -> KoiResult<Self> {
        Ok(HttpSimilarityClient::new(backends)?.map_or(Self::Disabled, Self::Http))
    }
}

impl IPredicateSimilarity for ConfiguredSimilarity {
    async fn similar(&self, query: &str, top_k: usize) -> KoiResult<Vec<ScoredPredicate>> {
        match self {
            Self::Http(client) => client.similar(query, top_k).await,
            Self::Disabled => Ok(Vec::new()),
        }
    }

    fn is_enabled(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
