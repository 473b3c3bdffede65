use koi_core::config::BackendConfig;
use koi_core::constants::GRAPH_API;
use koi_core::models::{GraphRequest, GraphRow};
use koi_core::traits::IGraphBackend;
use koi_core::KoiResult;
use reqwest::Client;

use crate::client::{self, HttpClientConfig};
use crate::protocol::GraphResponse;

/// Graph store reached over HTTP: `POST graph_url` with `{graph, query, columns}`.
#[derive(Debug, Clone)]
pub struct HttpGraphClient {
    client: Client,
    url: String,
}

impl HttpGraphClient {
    pub fn new(backends: &BackendConfig) -> KoiResult<Self> {
        let client = client::build_client(&HttpClientConfig::for_dependency(backends, GRAPH_API))?;
        Ok(Self::with_client(client, &backends.graph_url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl IGraphBackend for HttpGraphClient {
    async fn run(&self, request: &GraphRequest) -> KoiResult<Vec<GraphRow>> {
        let response: GraphResponse =
            client::post_json(&self.client, GRAPH_API, &self.url, request).await?;
        Ok(response.into_rows(GRAPH_API)?)
    }
}
